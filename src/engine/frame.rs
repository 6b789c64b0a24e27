use super::task::TaskHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

const SIGNAL_CAPACITY: usize = 16;

/// One "a frame can be drawn now" notification from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    pub at: Instant,
}

/// Host refresh signal. Every subscriber sees every tick emitted after it
/// subscribed (unless it lags), independently of the other subscribers.
#[derive(Clone)]
pub struct FrameSignal {
    tx: broadcast::Sender<FrameTick>,
    next_index: Arc<AtomicU64>,
}

impl FrameSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            tx,
            next_index: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameTick> {
        self.tx.subscribe()
    }

    /// Announces a frame; with no subscribers the tick is simply lost
    pub fn emit(&self) -> FrameTick {
        let tick = FrameTick {
            index: self.next_index.fetch_add(1, Ordering::Relaxed),
            at: Instant::now(),
        };
        let _ = self.tx.send(tick);
        tick
    }

    pub fn emitted(&self) -> u64 {
        self.next_index.load(Ordering::Relaxed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FrameSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a `FrameSignal` at a fixed refresh rate, standing in for vsync
/// when no display is attached
pub struct FrameClock {
    signal: FrameSignal,
    period: Duration,
    task: Option<TaskHandle>,
}

impl FrameClock {
    pub fn new(signal: FrameSignal, refresh_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64);
        Self {
            signal,
            period,
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let signal = self.signal.clone();
        self.task = Some(TaskHandle::spawn_periodic("frame-clock", self.period, move || {
            signal.emit();
        }));
    }

    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}
