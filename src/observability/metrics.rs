use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Health counters for one periodic task (generation, render, metrics)
pub struct TaskMetrics {
    task: String,
    ticks: AtomicU64,
    errors: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

impl TaskMetrics {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ticks: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_tick(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_tick(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }
}

/// Cost of the most recent rendered frame, written by the render task and
/// read by the performance monitor
#[derive(Default)]
pub struct RenderTimings {
    processing_us: AtomicU64,
    render_us: AtomicU64,
    frames: AtomicU64,
}

impl RenderTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, processing: Duration, render: Duration) {
        self.processing_us
            .store(processing.as_micros() as u64, Ordering::Relaxed);
        self.render_us.store(render.as_micros() as u64, Ordering::Relaxed);
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processing_ms(&self) -> f64 {
        self.processing_us.load(Ordering::Relaxed) as f64 / 1000.0
    }

    pub fn render_ms(&self) -> f64 {
        self.render_us.load(Ordering::Relaxed) as f64 / 1000.0
    }

    /// Frames rendered since creation
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

/// Pipeline health reported once per monitoring interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameMetrics {
    pub fps: u32,
    #[serde(rename = "memoryUsageMB")]
    pub memory_usage_mb: f64,
    #[serde(rename = "renderTimeMs")]
    pub render_time_ms: f64,
    #[serde(rename = "processingTimeMs")]
    pub processing_time_ms: f64,
}
