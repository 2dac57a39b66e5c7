use tempfile::tempdir;

use crate::metrics::{EpisodeWindow, MetricsTracker, TrainingMetrics};

#[test]
fn test_window_average_and_eviction() {
    let mut window = EpisodeWindow::new(3);
    assert!(window.average().is_none());

    window.push(10);
    assert_eq!(window.average(), Some(10.0));
    assert!(!window.is_full());

    window.push(20);
    window.push(30);
    assert!(window.is_full());
    assert_eq!(window.average(), Some(20.0));

    window.push(60);
    assert_eq!(window.len(), 3);
    assert_eq!(window.lengths().copied().collect::<Vec<_>>(), vec![20, 30, 60]);
    assert_eq!(window.average(), Some(110.0 / 3.0));
}

#[test]
fn test_tracker_episode_losses() {
    let mut tracker = MetricsTracker::new();
    tracker.record_loss(1.0);
    tracker.record_loss(3.0);
    assert_eq!(tracker.current_episode_loss(), Some(2.0));
    tracker.end_episode(12, 12.0, 0.9);

    assert_eq!(tracker.current_episode_loss(), None);
    tracker.end_episode(8, 10.0, 0.8);

    let metrics = tracker.metrics();
    assert_eq!(tracker.episode_count(), 2);
    assert_eq!(metrics.episode_lengths, vec![12, 8]);
    assert_eq!(metrics.rolling_averages, vec![12.0, 10.0]);
    assert_eq!(metrics.episode_losses, vec![Some(2.0), None]);
}

#[test]
fn test_tracker_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metrics.json");

    let mut tracker = MetricsTracker::new();
    tracker.record_loss(0.5);
    tracker.end_episode(21, 21.0, 0.5);
    tracker.save(&path).unwrap();

    let data = std::fs::read_to_string(&path).unwrap();
    let loaded: TrainingMetrics = serde_json::from_str(&data).unwrap();
    assert_eq!(loaded.episode_lengths, vec![21]);
    assert_eq!(loaded.episode_losses, vec![Some(0.5)]);
}
