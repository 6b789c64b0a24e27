use super::generator::{Clock, SystemClock, REGIONS};
use super::SampleSource;
use crate::core::{Category, Sample};
use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Spacing of seeded samples, matching the generator's default cadence
pub const SEED_SPACING_MS: i64 = 100;

/// Builds `count` samples ending just before `now_ms`: a slow sinusoid over
/// a rising trend with uniform noise, clamped at zero.
pub fn seed_samples(count: usize, now_ms: i64, rng: &mut impl Rng) -> Vec<Sample> {
    let total = count as f64;
    (0..count)
        .map(|i| {
            let timestamp = now_ms - (count - i) as i64 * SEED_SPACING_MS;
            let sine = (i as f64 / 100.0).sin() * 30.0;
            let noise = rng.gen_range(-10.0..10.0);
            let trend = i as f64 / total * 50.0;
            let value = (100.0 + sine + noise + trend).max(0.0);

            Sample::new(timestamp, value, Category::from_index(i))
                .with_metadata("source", "sensor")
                .with_metadata("region", REGIONS[i % REGIONS.len()])
        })
        .collect()
}

/// Local stand-in for the bulk-fetch endpoint
pub struct SyntheticSource {
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_clock(Arc::new(SystemClock), seed)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, seed: Option<u64>) -> Self {
        Self { clock, seed }
    }
}

#[async_trait]
impl SampleSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn fetch(&self, count: usize) -> Result<Vec<Sample>> {
        let now = self.clock.now_ms()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(seed_samples(count, now, &mut rng))
    }
}
