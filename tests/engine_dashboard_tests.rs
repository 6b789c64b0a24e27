use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use streamview::core::{Category, Sample};
use streamview::engine::{recording_slots, Dashboard, SchedulerState};
use streamview::observability::{FrameMetrics, NoMemoryProbe};
use streamview::sources::{Clock, ManualClock, SampleSource, SyntheticSource};
use streamview::DashboardConfig;

const NOW_MS: i64 = 1_700_000_000_000;

fn dashboard(config: DashboardConfig, clock: &ManualClock) -> (Dashboard, Vec<streamview::core::RecordingSurface>) {
    let (slots, surfaces) = recording_slots(&config.render.charts).unwrap();
    let dashboard = Dashboard::with_parts(config, slots, Arc::new(clock.clone()), Arc::new(NoMemoryProbe)).unwrap();
    (dashboard, surfaces)
}

struct FailingSource;

#[async_trait]
impl SampleSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self, _count: usize) -> Result<Vec<Sample>> {
        bail!("endpoint unreachable")
    }
}

struct StuckClock;

impl Clock for StuckClock {
    fn now_ms(&self) -> Result<i64> {
        bail!("clock stuck")
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_buffer_evicts_oldest_under_generation() {
    let clock = ManualClock::new(NOW_MS);
    let mut config = DashboardConfig::default();
    config.generator.seed = Some(3);
    config.render.refresh_hz = 10;
    let (mut dashboard, surfaces) = dashboard(config, &clock);
    let source = SyntheticSource::with_clock(Arc::new(clock.clone()), Some(3));

    let seeded = dashboard.start(&source).await.unwrap();
    assert_eq!(seeded, 10_000);
    assert_eq!(dashboard.buffer().len(), 10_000);
    let original: Vec<i64> = dashboard
        .buffer()
        .with_snapshot(|samples| samples.iter().take(51).map(|s| s.timestamp).collect());

    tokio::time::sleep(Duration::from_millis(5_050)).await;

    assert_eq!(dashboard.generation().metrics().ticks(), 50);
    assert_eq!(dashboard.buffer().len(), 10_000);
    dashboard.buffer().with_snapshot(|samples| {
        assert_eq!(samples[0].timestamp, original[50]);
        assert!(samples.iter().all(|s| !original[..50].contains(&s.timestamp)));
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    });
    assert!(surfaces.iter().all(|surface| surface.frames() > 0));

    dashboard.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_failed_seed_starts_empty() {
    let clock = ManualClock::new(NOW_MS);
    let (mut dashboard, _surfaces) = dashboard(DashboardConfig::default(), &clock);

    let seeded = dashboard.start(&FailingSource).await.unwrap();
    assert_eq!(seeded, 0);
    assert!(dashboard.buffer().is_empty());
    assert_eq!(dashboard.state(), SchedulerState::Running);

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(dashboard.buffer().len(), 3);
    dashboard.buffer().with_snapshot(|samples| assert_eq!(samples[0].value, 100.0));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_every_task() {
    let clock = ManualClock::new(NOW_MS);
    let (mut dashboard, surfaces) = dashboard(DashboardConfig::default(), &clock);
    let reports = Arc::new(AtomicUsize::new(0));
    let seen = reports.clone();
    dashboard.set_metrics_observer(Some(Box::new(move |_metrics: &FrameMetrics| {
        seen.fetch_add(1, Ordering::SeqCst);
    })));

    dashboard.start(&FailingSource).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    dashboard.shutdown();
    dashboard.shutdown();
    assert_eq!(dashboard.state(), SchedulerState::Stopped);

    let samples = dashboard.buffer().len();
    let frames = surfaces[0].frames();
    let observed = reports.load(Ordering::SeqCst);
    assert_eq!(observed, 1);

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert_eq!(dashboard.buffer().len(), samples);
    assert_eq!(surfaces[0].frames(), frames);
    assert_eq!(reports.load(Ordering::SeqCst), observed);
}

#[tokio::test(start_paused = true)]
async fn test_monitor_sees_frame_clock() {
    let clock = ManualClock::new(NOW_MS);
    let (mut dashboard, _surfaces) = dashboard(DashboardConfig::default(), &clock);
    dashboard.start(&FailingSource).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_010)).await;
    let metrics = dashboard.latest_metrics().unwrap();
    assert!((55..=61).contains(&metrics.fps), "fps was {}", metrics.fps);
    assert_eq!(metrics.memory_usage_mb, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_host_driven_frames() {
    let clock = ManualClock::new(NOW_MS);
    let mut config = DashboardConfig::default();
    config.render.frame_clock = false;
    let (mut dashboard, surfaces) = dashboard(config, &clock);
    dashboard.start(&FailingSource).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(surfaces[0].frames(), 0);

    dashboard.signal().emit();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(surfaces[0].frames(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_generation_errors_reach_callback() {
    let config = DashboardConfig::default();
    let (slots, _surfaces) = recording_slots(&config.render.charts).unwrap();
    let mut dashboard = Dashboard::with_parts(config, slots, Arc::new(StuckClock), Arc::new(NoMemoryProbe)).unwrap();
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    dashboard.set_generation_error_callback(Some(Arc::new(move |_e: &anyhow::Error| {
        seen.fetch_add(1, Ordering::SeqCst);
    })));

    dashboard.start(&FailingSource).await.unwrap();
    tokio::time::sleep(Duration::from_millis(550)).await;

    assert_eq!(errors.load(Ordering::SeqCst), 5);
    assert!(dashboard.buffer().is_empty());
    assert!(dashboard.report().contains("5 errors"));
}

#[tokio::test(start_paused = true)]
async fn test_callback_set_while_running_is_used() {
    let config = DashboardConfig::default();
    let (slots, _surfaces) = recording_slots(&config.render.charts).unwrap();
    let mut dashboard = Dashboard::with_parts(config, slots, Arc::new(StuckClock), Arc::new(NoMemoryProbe)).unwrap();
    dashboard.start(&FailingSource).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    dashboard.set_generation_error_callback(Some(Arc::new(move |_e: &anyhow::Error| {
        seen.fetch_add(1, Ordering::SeqCst);
    })));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(errors.load(Ordering::SeqCst), 3);
    assert_eq!(dashboard.generation().metrics().errors(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_restart_keeps_buffer_ordered() {
    let clock = ManualClock::new(NOW_MS);
    let mut config = DashboardConfig::default();
    config.source.count = 100;
    config.render.refresh_hz = 10;
    let (mut dashboard, _surfaces) = dashboard(config, &clock);
    let source = SyntheticSource::with_clock(Arc::new(clock.clone()), Some(5));

    assert_eq!(dashboard.start(&source).await.unwrap(), 100);
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    dashboard.shutdown();
    assert_eq!(dashboard.buffer().len(), 110);

    assert_eq!(dashboard.start(&source).await.unwrap(), 0);
    assert_eq!(dashboard.buffer().len(), 110);
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    dashboard.shutdown();

    assert_eq!(dashboard.buffer().len(), 120);
    dashboard.buffer().with_snapshot(|samples| {
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    });
}

#[tokio::test(start_paused = true)]
async fn test_paused_stream_keeps_rendering() {
    let clock = ManualClock::new(NOW_MS);
    let mut config = DashboardConfig::default();
    config.render.refresh_hz = 10;
    let (mut dashboard, surfaces) = dashboard(config, &clock);
    dashboard.start(&FailingSource).await.unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(dashboard.buffer().len(), 3);

    dashboard.pause_stream();
    assert!(!dashboard.is_streaming());
    assert_eq!(dashboard.generation().state(), SchedulerState::Stopped);
    let frames: Vec<u64> = surfaces.iter().map(|surface| surface.frames()).collect();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(dashboard.buffer().len(), 3);
    for (surface, before) in surfaces.iter().zip(&frames) {
        assert!(surface.frames() > *before);
    }

    dashboard.resume_stream();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(dashboard.buffer().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_stream_choice_survives_restart() {
    let clock = ManualClock::new(NOW_MS);
    let (mut dashboard, _surfaces) = dashboard(DashboardConfig::default(), &clock);
    dashboard.pause_stream();

    dashboard.start(&FailingSource).await.unwrap();
    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(dashboard.buffer().is_empty());
    assert_eq!(dashboard.state(), SchedulerState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_table_reads_shared_buffer() {
    let clock = ManualClock::new(NOW_MS);
    let (dashboard, _surfaces) = dashboard(DashboardConfig::default(), &clock);
    dashboard
        .buffer()
        .append_batch((0..5000).map(|i| Sample::new(i, i as f64, Category::from_index(i as usize))));

    let (range, rows) = dashboard.table_rows(3500.0);
    assert_eq!((range.start, range.end), (100, 113));
    assert_eq!(rows.len(), 13);
    assert_eq!(rows[12].timestamp, 112);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = DashboardConfig::default();
    config.buffer.capacity = 0;
    let (slots, _) = recording_slots(&config.render.charts).unwrap();
    let err = Dashboard::new(config, slots).err().unwrap();
    assert!(format!("{:#}", err).contains("buffer.capacity"));
}
