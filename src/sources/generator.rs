use crate::core::{Category, Sample};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// Wall-clock source for sample timestamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> Result<i64>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Result<i64> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?;
        i64::try_from(elapsed.as_millis()).context("System clock out of range")
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Result<i64> {
        Ok(self.now.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Cadence of the generation task
    pub interval_ms: u64,
    /// Random walk step is uniform over [-step_amplitude, step_amplitude]
    pub step_amplitude: f64,
    pub periodic_amplitude: f64,
    pub periodic_period_ms: f64,
    /// Generated values never drop below this
    pub floor_value: f64,
    /// Value of the first sample when there is nothing to walk from
    pub initial_value: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            step_amplitude: 2.5,
            periodic_amplitude: 10.0,
            periodic_period_ms: 10_000.0,
            floor_value: 50.0,
            initial_value: 100.0,
            seed: None,
        }
    }
}

/// Produces the next sample from the previous one: a bounded random walk
/// plus a sinusoid of the timestamp, floored so values stay positive.
pub struct StreamGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    clock: Arc<dyn Clock>,
}

impl StreamGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: GeneratorConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng, clock }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn next(&mut self, previous: &Sample) -> Result<Sample> {
        let now = self.clock.now_ms()?;
        // the source clock may step backwards; timestamps may not
        let timestamp = if now < previous.timestamp {
            previous.timestamp.saturating_add(1)
        } else {
            now
        };

        let amplitude = self.config.step_amplitude.abs();
        let step = if amplitude > 0.0 {
            self.rng.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        };
        let value = (previous.value + step + self.periodic_component(timestamp))
            .max(self.config.floor_value);

        Ok(self.tagged(timestamp, value))
    }

    /// First sample of a stream that has no history
    pub fn origin(&mut self) -> Result<Sample> {
        let timestamp = self.clock.now_ms()?;
        let value = self.config.initial_value.max(self.config.floor_value);
        Ok(self.tagged(timestamp, value))
    }

    pub fn periodic_component(&self, timestamp: i64) -> f64 {
        if self.config.periodic_period_ms <= 0.0 {
            return 0.0;
        }
        let phase = 2.0 * PI * timestamp as f64 / self.config.periodic_period_ms;
        self.config.periodic_amplitude * phase.sin()
    }

    fn tagged(&mut self, timestamp: i64, value: f64) -> Sample {
        let category = Category::ALL[self.rng.gen_range(0..Category::ALL.len())];
        let region = REGIONS[self.rng.gen_range(0..REGIONS.len())];
        Sample::new(timestamp, value, category)
            .with_metadata("source", "sensor")
            .with_metadata("region", region)
    }
}
