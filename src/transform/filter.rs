use crate::core::{Category, Sample};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "6h")]
    Last6Hours,
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn duration_ms(&self) -> Option<i64> {
        match self {
            TimeRange::LastHour => Some(HOUR_MS),
            TimeRange::Last6Hours => Some(6 * HOUR_MS),
            TimeRange::Last24Hours => Some(24 * HOUR_MS),
            TimeRange::Last7Days => Some(7 * 24 * HOUR_MS),
            TimeRange::All => None,
        }
    }

    /// Inclusive lower bound on timestamps for a window ending at `end_ms`
    pub fn start_ms(&self, end_ms: i64) -> i64 {
        match self.duration_ms() {
            Some(duration) => end_ms.saturating_sub(duration),
            None => i64::MIN,
        }
    }
}

/// Narrows the sample set every chart draws from.
///
/// Relative time ranges end at the newest sample of the snapshot being
/// filtered, so one snapshot always yields the same subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleFilter {
    pub time_range: TimeRange,
    pub categories: Vec<Category>,
    /// Inclusive (min, max)
    pub value_range: Option<(f64, f64)>,
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self {
            time_range: TimeRange::All,
            categories: Category::ALL.to_vec(),
            value_range: None,
        }
    }
}

impl SampleFilter {
    pub fn validate(&self) -> Result<()> {
        if let Some((min, max)) = self.value_range {
            ensure!(
                min <= max,
                "Filter value range is inverted: {} > {}",
                min,
                max
            );
        }
        Ok(())
    }

    pub fn is_pass_through(&self) -> bool {
        self.time_range == TimeRange::All
            && Category::ALL.iter().all(|c| self.categories.contains(c))
            && self.value_range.is_none()
    }

    pub fn matches(&self, sample: &Sample, start_ms: i64) -> bool {
        let in_time = sample.timestamp >= start_ms;
        let in_category = self.categories.contains(&sample.category);
        let in_value = self
            .value_range
            .map_or(true, |(min, max)| sample.value >= min && sample.value <= max);
        in_time && in_category && in_value
    }

    pub fn apply<'a>(&self, samples: &'a [Sample]) -> Cow<'a, [Sample]> {
        if self.is_pass_through() {
            return Cow::Borrowed(samples);
        }
        let end = samples.last().map_or(0, |s| s.timestamp);
        let start = self.time_range.start_ms(end);
        Cow::Owned(
            samples
                .iter()
                .filter(|s| self.matches(s, start))
                .cloned()
                .collect(),
        )
    }
}
