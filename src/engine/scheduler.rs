use super::frame::{FrameSignal, FrameTick};
use super::state::SchedulerState;
use super::task::TaskHandle;
use crate::buffers::SharedBuffer;
use crate::charts::Chart;
use crate::core::{Color, DrawSurface, Point, Sample};
use crate::observability::{RenderTimings, TaskMetrics};
use crate::resilience::TickGuard;
use crate::transform::SampleFilter;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::TryRecvError};

const TITLE_POSITION: Point = Point { x: 10.0, y: 20.0 };

/// A chart and the canvas it owns
pub struct ChartSlot {
    pub chart: Box<dyn Chart>,
    pub surface: Box<dyn DrawSurface>,
}

impl ChartSlot {
    pub fn new(chart: Box<dyn Chart>, surface: Box<dyn DrawSurface>) -> Self {
        Self { chart, surface }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Samples left after filtering
    pub samples: usize,
    /// Data elements drawn across all charts
    pub elements: usize,
    pub processing: Duration,
    pub render: Duration,
}

/// Turns one buffer snapshot into one full redraw of every chart
pub struct Renderer {
    slots: Vec<ChartSlot>,
    filter: SampleFilter,
}

impl Renderer {
    pub fn new(slots: Vec<ChartSlot>) -> Self {
        Self {
            slots,
            filter: SampleFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: SampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_filter(&mut self, filter: SampleFilter) {
        self.filter = filter;
    }

    pub fn slots(&self) -> &[ChartSlot] {
        &self.slots
    }

    pub fn render(&mut self, snapshot: &[Sample]) -> FrameReport {
        let started = Instant::now();
        let visible = self.filter.apply(snapshot);
        for slot in &mut self.slots {
            slot.chart.prepare(&visible);
        }
        let processing = started.elapsed();

        let started = Instant::now();
        let mut elements = 0;
        for slot in &mut self.slots {
            let canvas = slot.surface.bounds();
            slot.surface.clear(canvas, Color::WHITE);
            slot.surface.draw_text(slot.chart.title(), TITLE_POSITION, Color::LABEL);
            slot.chart.draw(slot.surface.as_mut());
            elements += slot.chart.element_count();
        }

        FrameReport {
            samples: visible.len(),
            elements,
            processing,
            render: started.elapsed(),
        }
    }
}

/// Redraws every chart once per available frame.
///
/// Ticks never overlap: the whole frame runs synchronously inside one task.
/// Frames that queued up while a frame was drawing are collapsed into the
/// newest one.
pub struct RenderScheduler {
    buffer: SharedBuffer,
    signal: FrameSignal,
    renderer: Arc<Mutex<Renderer>>,
    timings: Arc<RenderTimings>,
    guard: TickGuard,
    state: SchedulerState,
    task: Option<TaskHandle>,
}

impl RenderScheduler {
    pub fn new(buffer: SharedBuffer, signal: FrameSignal, renderer: Renderer, timings: Arc<RenderTimings>) -> Self {
        Self {
            buffer,
            signal,
            renderer: Arc::new(Mutex::new(renderer)),
            timings,
            guard: TickGuard::new(Arc::new(TaskMetrics::new("render"))),
            state: SchedulerState::Stopped,
            task: None,
        }
    }

    pub fn with_guard(mut self, guard: TickGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn timings(&self) -> &Arc<RenderTimings> {
        &self.timings
    }

    pub fn renderer(&self) -> MutexGuard<'_, Renderer> {
        self.renderer.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn start(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Running) {
            return;
        }

        let buffer = self.buffer.clone();
        let renderer = self.renderer.clone();
        let timings = self.timings.clone();
        let guard = self.guard.clone();
        self.task = Some(TaskHandle::spawn_on_frames(
            "render",
            self.signal.subscribe(),
            move |tick, frames| {
                let tick = latest_tick(tick, frames);
                guard.run(|| {
                    let report = {
                        let snapshot = buffer.read();
                        let mut renderer = renderer.lock().unwrap_or_else(|p| p.into_inner());
                        renderer.render(snapshot.snapshot())
                    };
                    timings.record(report.processing, report.render);
                    log::trace!(
                        "frame {}: {} samples, {} elements, {:?} + {:?}",
                        tick.index,
                        report.samples,
                        report.elements,
                        report.processing,
                        report.render
                    );
                    Ok(())
                });
            },
            |missed| log::trace!("render skipped {} frames", missed),
        ));

        self.state = SchedulerState::Running;
        log::debug!("Render scheduler started");
    }

    pub fn stop(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Stopped) {
            return;
        }
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        self.state = SchedulerState::Stopped;
        log::debug!("Render scheduler stopped");
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn latest_tick(mut tick: FrameTick, frames: &mut broadcast::Receiver<FrameTick>) -> FrameTick {
    loop {
        match frames.try_recv() {
            Ok(newer) => tick = newer,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return tick,
        }
    }
}
