use super::{FrameMetrics, MemoryProbe, RenderTimings, TaskMetrics};
use crate::engine::{FrameSignal, SchedulerState, TaskHandle};
use crate::resilience::TickGuard;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// The single consumer of `FrameMetrics`
pub type MetricsObserver = Box<dyn Fn(&FrameMetrics) + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// `round(frames * 1000 / elapsed_ms)`, 0 for an empty window
pub fn compute_fps(frames: u64, elapsed_ms: f64) -> u32 {
    if elapsed_ms <= 0.0 {
        return 0;
    }
    (frames as f64 * 1000.0 / elapsed_ms).round() as u32
}

/// Frames observed since the start of the current measuring window
pub struct FpsCounter {
    frames: AtomicU64,
    window_start: Mutex<Instant>,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: AtomicU64::new(0),
            window_start: Mutex::new(now),
        }
    }

    pub fn record_frame(&self) {
        self.add(1);
    }

    pub fn add(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn reset(&self, now: Instant) {
        self.frames.store(0, Ordering::Relaxed);
        *self.window_start.lock().unwrap_or_else(|p| p.into_inner()) = now;
    }

    /// Closes the window at `now` and starts the next one
    pub fn sample(&self, now: Instant) -> u32 {
        let mut start = self.window_start.lock().unwrap_or_else(|p| p.into_inner());
        let frames = self.frames.swap(0, Ordering::Relaxed);
        let elapsed = now.saturating_duration_since(*start);
        *start = now;
        compute_fps(frames, elapsed.as_secs_f64() * 1000.0)
    }
}

/// Observes the pipeline's own health: achieved frame rate, memory and the
/// cost of the last frame.
///
/// It hooks the frame signal on its own, separately from the render
/// scheduler, and reports on an independent wall-clock interval.
pub struct PerformanceMonitor {
    signal: FrameSignal,
    interval: Duration,
    timings: Arc<RenderTimings>,
    probe: Arc<dyn MemoryProbe>,
    counter: Arc<FpsCounter>,
    observer: Arc<Mutex<Option<MetricsObserver>>>,
    latest: Arc<Mutex<Option<FrameMetrics>>>,
    guard: TickGuard,
    state: SchedulerState,
    frame_task: Option<TaskHandle>,
    interval_task: Option<TaskHandle>,
}

impl PerformanceMonitor {
    pub fn new(signal: FrameSignal, timings: Arc<RenderTimings>, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            signal,
            interval: Duration::from_millis(MonitorConfig::default().interval_ms),
            timings,
            probe,
            counter: Arc::new(FpsCounter::new(Instant::now())),
            observer: Arc::new(Mutex::new(None)),
            latest: Arc::new(Mutex::new(None)),
            guard: TickGuard::new(Arc::new(TaskMetrics::new("metrics"))),
            state: SchedulerState::Stopped,
            frame_task: None,
            interval_task: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_guard(mut self, guard: TickGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replaces the registered observer; `None` unregisters it
    pub fn set_observer(&self, observer: Option<MetricsObserver>) {
        *self.observer.lock().unwrap_or_else(|p| p.into_inner()) = observer;
    }

    pub fn latest(&self) -> Option<FrameMetrics> {
        *self.latest.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn start(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Running) {
            return;
        }

        self.counter.reset(Instant::now());

        let frames = self.counter.clone();
        let lagged = self.counter.clone();
        self.frame_task = Some(TaskHandle::spawn_on_frames(
            "monitor-frames",
            self.signal.subscribe(),
            move |_tick, _frames| frames.record_frame(),
            move |missed| lagged.add(missed),
        ));

        let counter = self.counter.clone();
        let timings = self.timings.clone();
        let probe = self.probe.clone();
        let observer = self.observer.clone();
        let latest = self.latest.clone();
        let guard = self.guard.clone();
        self.interval_task = Some(TaskHandle::spawn_periodic("metrics", self.interval, move || {
            guard.run(|| {
                let metrics = FrameMetrics {
                    fps: counter.sample(Instant::now()),
                    memory_usage_mb: probe.used_mb(),
                    render_time_ms: timings.render_ms(),
                    processing_time_ms: timings.processing_ms(),
                };
                log::trace!("frame metrics: {:?}", metrics);
                *latest.lock().unwrap_or_else(|p| p.into_inner()) = Some(metrics);
                report(&observer, &metrics);
                Ok(())
            });
        }));

        self.state = SchedulerState::Running;
        log::debug!("Performance monitor started ({:?} interval)", self.interval);
    }

    pub fn stop(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Stopped) {
            return;
        }
        if let Some(mut task) = self.frame_task.take() {
            task.cancel();
        }
        if let Some(mut task) = self.interval_task.take() {
            task.cancel();
        }
        self.state = SchedulerState::Stopped;
        log::debug!("Performance monitor stopped");
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn report(observer: &Mutex<Option<MetricsObserver>>, metrics: &FrameMetrics) {
    let observer = observer.lock().unwrap_or_else(|p| p.into_inner());
    if let Some(callback) = observer.as_ref() {
        if panic::catch_unwind(AssertUnwindSafe(|| callback(metrics))).is_err() {
            log::error!("Metrics observer panicked on {:?}", metrics);
        }
    }
}
