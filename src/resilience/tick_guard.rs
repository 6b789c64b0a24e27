use crate::observability::TaskMetrics;
use anyhow::{anyhow, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Receives failures that a guarded tick swallowed
pub type ErrorCallback = Arc<dyn Fn(&anyhow::Error) + Send + Sync>;

/// Runs one tick of a periodic task so that its failure stays inside that
/// tick: errors and panics are counted, logged and handed to the optional
/// callback, and the task carries on with its next tick.
///
/// Clones share the metrics and the callback slot, so replacing the callback
/// reaches a task that is already running.
#[derive(Clone)]
pub struct TickGuard {
    metrics: Arc<TaskMetrics>,
    on_error: Arc<Mutex<Option<ErrorCallback>>>,
}

impl TickGuard {
    pub fn new(metrics: Arc<TaskMetrics>) -> Self {
        Self {
            metrics,
            on_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.set_error_callback(Some(callback));
        self
    }

    pub fn set_error_callback(&self, callback: Option<ErrorCallback>) {
        *self.on_error.lock().unwrap_or_else(|p| p.into_inner()) = callback;
    }

    pub fn metrics(&self) -> &Arc<TaskMetrics> {
        &self.metrics
    }

    /// Returns the tick's value, or `None` if it failed
    pub fn run<T, F>(&self, tick: F) -> Option<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let start = self.metrics.start_tick();
        let outcome = match panic::catch_unwind(AssertUnwindSafe(tick)) {
            Ok(result) => result,
            Err(payload) => Err(anyhow!("panicked: {}", panic_message(payload.as_ref()))),
        };

        match outcome {
            Ok(value) => {
                self.metrics.finish_tick(start);
                self.metrics.record_tick();
                Some(value)
            }
            Err(e) => {
                self.metrics.record_error();
                log::warn!("{} tick failed: {:#}", self.metrics.task(), e);
                let callback = self.on_error.lock().unwrap_or_else(|p| p.into_inner()).clone();
                if let Some(callback) = callback {
                    notify(&callback, &e);
                }
                None
            }
        }
    }
}

fn notify(callback: &ErrorCallback, error: &anyhow::Error) {
    if panic::catch_unwind(AssertUnwindSafe(|| callback(error))).is_err() {
        log::error!("error callback panicked while handling: {:#}", error);
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
