use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use streamview::engine::{FrameSignal, SchedulerState};
use streamview::observability::{
    FrameMetrics, MemoryProbe, NoMemoryProbe, PerformanceMonitor, RenderTimings,
};
use tokio::sync::mpsc;

fn monitor(signal: &FrameSignal, timings: Arc<RenderTimings>) -> PerformanceMonitor {
    PerformanceMonitor::new(signal.clone(), timings, Arc::new(NoMemoryProbe))
        .with_interval(Duration::from_millis(1000))
}

fn observe(monitor: &PerformanceMonitor) -> mpsc::UnboundedReceiver<FrameMetrics> {
    let (tx, rx) = mpsc::unbounded_channel();
    monitor.set_observer(Some(Box::new(move |metrics: &FrameMetrics| {
        let _ = tx.send(*metrics);
    })));
    rx
}

#[tokio::test(start_paused = true)]
async fn test_fps_matches_frames_in_window() {
    let signal = FrameSignal::new();
    let mut monitor = monitor(&signal, Arc::new(RenderTimings::new()));
    let mut reports = observe(&monitor);
    monitor.start();

    for _ in 0..30 {
        signal.emit();
        tokio::task::yield_now().await;
    }
    let first = reports.recv().await.unwrap();
    assert_eq!(first.fps, 30);

    for _ in 0..15 {
        signal.emit();
        tokio::task::yield_now().await;
    }
    let second = reports.recv().await.unwrap();
    assert_eq!(second.fps, 15);
}

#[tokio::test(start_paused = true)]
async fn test_fps_over_longer_interval() {
    let signal = FrameSignal::new();
    let mut monitor = PerformanceMonitor::new(signal.clone(), Arc::new(RenderTimings::new()), Arc::new(NoMemoryProbe))
        .with_interval(Duration::from_millis(1500));
    let mut reports = observe(&monitor);
    monitor.start();

    for _ in 0..45 {
        signal.emit();
        tokio::task::yield_now().await;
    }
    assert_eq!(reports.recv().await.unwrap().fps, 30);
}

#[tokio::test(start_paused = true)]
async fn test_lagged_frames_still_count() {
    let signal = FrameSignal::new();
    let mut monitor = monitor(&signal, Arc::new(RenderTimings::new()));
    let mut reports = observe(&monitor);
    monitor.start();

    for _ in 0..40 {
        signal.emit();
    }
    assert_eq!(reports.recv().await.unwrap().fps, 40);
}

#[tokio::test(start_paused = true)]
async fn test_reports_last_frame_cost_and_memory() {
    struct FixedProbe;
    impl MemoryProbe for FixedProbe {
        fn used_mb(&self) -> f64 {
            12.5
        }
    }

    let signal = FrameSignal::new();
    let timings = Arc::new(RenderTimings::new());
    timings.record(Duration::from_millis(4), Duration::from_millis(2));
    let mut monitor = PerformanceMonitor::new(signal.clone(), timings, Arc::new(FixedProbe));
    let mut reports = observe(&monitor);
    monitor.start();

    let metrics = reports.recv().await.unwrap();
    assert_eq!(metrics.fps, 0);
    assert_eq!(metrics.memory_usage_mb, 12.5);
    assert_eq!(metrics.processing_time_ms, 4.0);
    assert_eq!(metrics.render_time_ms, 2.0);
    assert_eq!(monitor.latest(), Some(metrics));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_observer_is_contained() {
    let signal = FrameSignal::new();
    let mut monitor = monitor(&signal, Arc::new(RenderTimings::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    monitor.set_observer(Some(Box::new(move |_metrics: &FrameMetrics| {
        seen.fetch_add(1, Ordering::SeqCst);
        panic!("observer failure");
    })));
    monitor.start();

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(monitor.latest().is_some());
    assert_eq!(monitor.state(), SchedulerState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_both_hooks() {
    let signal = FrameSignal::new();
    let mut monitor = monitor(&signal, Arc::new(RenderTimings::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    monitor.set_observer(Some(Box::new(move |_metrics: &FrameMetrics| {
        seen.fetch_add(1, Ordering::SeqCst);
    })));

    monitor.start();
    monitor.start();
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    monitor.stop();
    monitor.stop();
    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.state(), SchedulerState::Stopped);

    tokio::task::yield_now().await;
    assert_eq!(signal.subscriber_count(), 0);
}

#[test]
fn test_metrics_serialize_with_wire_names() {
    let metrics = FrameMetrics {
        fps: 60,
        memory_usage_mb: 1.5,
        render_time_ms: 2.0,
        processing_time_ms: 0.5,
    };
    let json = serde_json::to_value(metrics).unwrap();
    assert_eq!(json["fps"], 60);
    assert_eq!(json["memoryUsageMB"], 1.5);
    assert_eq!(json["renderTimeMs"], 2.0);
    assert_eq!(json["processingTimeMs"], 0.5);
}
