use super::frame::{FrameClock, FrameSignal};
use super::generation::GenerationTask;
use super::scheduler::{ChartSlot, RenderScheduler, Renderer};
use super::state::SchedulerState;
use crate::buffers::SharedBuffer;
use crate::charts::{create_chart, ChartConfig};
use crate::config::DashboardConfig;
use crate::core::RecordingSurface;
use crate::observability::{
    FrameMetrics, MemoryProbe, MetricsCollector, MetricsObserver, PerformanceMonitor,
    ProcessMemoryProbe, RenderTimings,
};
use crate::resilience::{ErrorCallback, TickGuard};
use crate::sources::{Clock, SampleSource, StreamGenerator, SystemClock};
use crate::table::{TableRow, VisibleRange};
use crate::transform::SampleFilter;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builds one chart per config entry, each drawing onto its own
/// `RecordingSurface`. The returned surfaces share state with the slots.
pub fn recording_slots(charts: &[ChartConfig]) -> Result<(Vec<ChartSlot>, Vec<RecordingSurface>)> {
    let mut slots = Vec::with_capacity(charts.len());
    let mut surfaces = Vec::with_capacity(charts.len());
    for config in charts {
        let chart = create_chart(config)?;
        let surface = RecordingSurface::new(config.width, config.height);
        slots.push(ChartSlot::new(chart, Box::new(surface.clone())));
        surfaces.push(surface);
    }
    Ok((slots, surfaces))
}

/// The assembled pipeline: one buffer, its generator, the render scheduler
/// and the performance monitor, all driven by one frame signal.
///
/// Every consumer gets the same `SharedBuffer` handle, so the charts and the
/// table always observe one sample set.
pub struct Dashboard {
    config: DashboardConfig,
    buffer: SharedBuffer,
    signal: FrameSignal,
    frame_clock: Option<FrameClock>,
    generation: GenerationTask,
    scheduler: RenderScheduler,
    monitor: PerformanceMonitor,
    collector: MetricsCollector,
    state: SchedulerState,
    streaming: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, slots: Vec<ChartSlot>) -> Result<Self> {
        Self::with_parts(config, slots, Arc::new(SystemClock), Arc::new(ProcessMemoryProbe::new()))
    }

    pub fn with_parts(
        config: DashboardConfig,
        slots: Vec<ChartSlot>,
        clock: Arc<dyn Clock>,
        probe: Arc<dyn MemoryProbe>,
    ) -> Result<Self> {
        config.validate().context("Invalid dashboard config")?;

        let mut collector = MetricsCollector::new();
        let buffer = SharedBuffer::new(config.buffer.capacity);
        let signal = FrameSignal::new();
        let timings = Arc::new(RenderTimings::new());

        let generator = StreamGenerator::with_clock(config.generator.clone(), clock);
        let generation = GenerationTask::new(buffer.clone(), generator)
            .with_guard(TickGuard::new(collector.register("generation")));

        let renderer = Renderer::new(slots).with_filter(config.render.filter.clone());
        let scheduler = RenderScheduler::new(buffer.clone(), signal.clone(), renderer, timings.clone())
            .with_guard(TickGuard::new(collector.register("render")));

        let monitor = PerformanceMonitor::new(signal.clone(), timings, probe)
            .with_interval(Duration::from_millis(config.monitor.interval_ms))
            .with_guard(TickGuard::new(collector.register("metrics")));

        let frame_clock = config
            .render
            .frame_clock
            .then(|| FrameClock::new(signal.clone(), config.render.refresh_hz));

        Ok(Self {
            config,
            buffer,
            signal,
            frame_clock,
            generation,
            scheduler,
            monitor,
            collector,
            state: SchedulerState::Stopped,
            streaming: true,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// Hosts without the built-in frame clock emit their frames here
    pub fn signal(&self) -> &FrameSignal {
        &self.signal
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn generation(&self) -> &GenerationTask {
        &self.generation
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn set_metrics_observer(&self, observer: Option<MetricsObserver>) {
        self.monitor.set_observer(observer);
    }

    pub fn latest_metrics(&self) -> Option<FrameMetrics> {
        self.monitor.latest()
    }

    pub fn set_generation_error_callback(&self, callback: Option<ErrorCallback>) {
        self.generation.set_error_callback(callback);
    }

    pub fn set_filter(&self, filter: SampleFilter) {
        self.scheduler.renderer().set_filter(filter);
    }

    /// Visible rows of the sample table at `scroll_offset`
    pub fn table_rows(&self, scroll_offset: f64) -> (VisibleRange, Vec<TableRow>) {
        self.buffer
            .with_snapshot(|samples| self.config.table.rows(scroll_offset, samples))
    }

    /// Whether new samples are being generated. Rendering and monitoring
    /// run regardless.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Pauses or resumes sample generation only. The charts keep redrawing
    /// the buffer as it is. While stopped, the choice is remembered for the
    /// next `start`.
    pub fn set_streaming(&mut self, enabled: bool) {
        if self.streaming == enabled {
            return;
        }
        self.streaming = enabled;
        if self.state.is_running() {
            if enabled {
                self.generation.start();
            } else {
                self.generation.stop();
            }
        }
        log::info!("Stream {}", if enabled { "resumed" } else { "paused" });
    }

    pub fn pause_stream(&mut self) {
        self.set_streaming(false);
    }

    pub fn resume_stream(&mut self) {
        self.set_streaming(true);
    }

    /// Seeds the buffer from `source`, then starts every periodic task.
    ///
    /// The seed is best-effort: a failing source is logged and the pipeline
    /// starts empty. Only an empty buffer is seeded, so a restart keeps the
    /// samples it already has. Returns the number of seeded samples.
    pub async fn start(&mut self, source: &dyn SampleSource) -> Result<usize> {
        if !self.state.can_transition_to(SchedulerState::Running) {
            return Ok(0);
        }

        let seeded = if !self.buffer.is_empty() {
            log::debug!("Buffer holds {} samples, skipping seed", self.buffer.len());
            0
        } else {
            self.seed(source).await
        };

        if self.streaming {
            self.generation.start();
        }
        self.scheduler.start();
        self.monitor.start();
        if let Some(clock) = self.frame_clock.as_mut() {
            clock.start();
            log::debug!("Frame clock ticking every {:?}", clock.period());
        }

        self.state = SchedulerState::Running;
        log::info!(
            "Dashboard running: {} charts, buffer {}/{}",
            self.config.render.charts.len(),
            self.buffer.len(),
            self.buffer.capacity()
        );
        Ok(seeded)
    }

    async fn seed(&self, source: &dyn SampleSource) -> usize {
        match source.fetch(self.config.source.count).await {
            Ok(samples) => {
                let count = samples.len();
                self.buffer.append_batch(samples);
                log::info!("Seeded {} samples from {}", count, source.name());
                count
            }
            Err(e) => {
                log::warn!("Initial fetch from {} failed, starting empty: {:#}", source.name(), e);
                0
            }
        }
    }

    /// Stops every periodic task. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Stopped) {
            return;
        }
        if let Some(clock) = self.frame_clock.as_mut() {
            clock.stop();
        }
        self.generation.stop();
        self.scheduler.stop();
        self.monitor.stop();
        self.state = SchedulerState::Stopped;
        log::info!("Dashboard stopped");
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    pub fn report(&self) -> String {
        self.collector.generate_report()
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}
