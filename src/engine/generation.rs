use super::state::SchedulerState;
use super::task::TaskHandle;
use crate::buffers::SharedBuffer;
use crate::core::Sample;
use crate::observability::TaskMetrics;
use crate::resilience::{ErrorCallback, TickGuard};
use crate::sources::StreamGenerator;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Feeds the buffer from a `StreamGenerator` on a fixed cadence.
///
/// A failed tick is dropped (the buffer is left untouched) and generation
/// resumes on the next one.
pub struct GenerationTask {
    buffer: SharedBuffer,
    generator: Arc<Mutex<StreamGenerator>>,
    interval: Duration,
    guard: TickGuard,
    state: SchedulerState,
    task: Option<TaskHandle>,
}

impl GenerationTask {
    pub fn new(buffer: SharedBuffer, generator: StreamGenerator) -> Self {
        let interval = Duration::from_millis(generator.config().interval_ms);
        Self {
            buffer,
            generator: Arc::new(Mutex::new(generator)),
            interval,
            guard: TickGuard::new(Arc::new(TaskMetrics::new("generation"))),
            state: SchedulerState::Stopped,
            task: None,
        }
    }

    pub fn with_guard(mut self, guard: TickGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Reaches the running task as well
    pub fn set_error_callback(&self, callback: Option<ErrorCallback>) {
        self.guard.set_error_callback(callback);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn metrics(&self) -> &Arc<TaskMetrics> {
        self.guard.metrics()
    }

    /// Runs one guarded tick right now
    pub fn step(&self) -> Option<Sample> {
        self.guard.run(|| generate(&self.buffer, &self.generator))
    }

    pub fn start(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Running) {
            return;
        }

        let buffer = self.buffer.clone();
        let generator = self.generator.clone();
        let guard = self.guard.clone();
        self.task = Some(TaskHandle::spawn_periodic("generation", self.interval, move || {
            guard.run(|| generate(&buffer, &generator));
        }));

        self.state = SchedulerState::Running;
        log::debug!("Generation started ({:?} cadence)", self.interval);
    }

    pub fn stop(&mut self) {
        if !self.state.can_transition_to(SchedulerState::Stopped) {
            return;
        }
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        self.state = SchedulerState::Stopped;
        log::debug!("Generation stopped");
    }
}

impl Drop for GenerationTask {
    fn drop(&mut self) {
        self.stop();
    }
}

fn generate(buffer: &SharedBuffer, generator: &Mutex<StreamGenerator>) -> Result<Sample> {
    let mut generator = generator.lock().unwrap_or_else(|p| p.into_inner());
    let sample = match buffer.last() {
        Some(previous) => generator.next(&previous)?,
        None => generator.origin()?,
    };
    buffer.append(sample.clone());
    Ok(sample)
}
