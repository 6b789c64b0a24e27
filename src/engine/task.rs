use super::frame::FrameTick;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Owned handle to one cancellable repeating task.
///
/// The loop schedules its next run only after the current one completes and
/// checks the stop flag before every run, so once `cancel` returns the body
/// never fires again. Cancelling twice is harmless; dropping the handle
/// cancels too.
pub struct TaskHandle {
    name: &'static str,
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Runs `body` every `period`, first run one period from now
    pub fn spawn_periodic<F>(name: &'static str, period: Duration, mut body: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                body();
            }
            log::trace!("{} task exited", name);
        });

        Self {
            name,
            stopped,
            handle: Some(handle),
        }
    }

    /// Runs `body` once per received frame tick. `on_lag` learns how many
    /// ticks were dropped because the body fell behind.
    pub fn spawn_on_frames<F, L>(
        name: &'static str,
        mut frames: broadcast::Receiver<FrameTick>,
        mut body: F,
        mut on_lag: L,
    ) -> Self
    where
        F: FnMut(FrameTick, &mut broadcast::Receiver<FrameTick>) + Send + 'static,
        L: FnMut(u64) + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();
        let handle = tokio::spawn(async move {
            loop {
                let tick = match frames.recv().await {
                    Ok(tick) => tick,
                    Err(RecvError::Lagged(missed)) => {
                        on_lag(missed);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if flag.load(Ordering::Acquire) {
                    break;
                }
                body(tick, &mut frames);
            }
            log::trace!("{} task exited", name);
        });

        Self {
            name,
            stopped,
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("{} task cancelled", self.name);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
