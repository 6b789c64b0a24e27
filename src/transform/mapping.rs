use super::aggregate::Bucket;
use crate::core::Sample;

/// Value and time extent of the sample set drawn in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_value: f64,
    pub max_value: f64,
    pub min_time: i64,
    pub max_time: i64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 100.0,
            min_time: 0,
            max_time: 1,
        }
    }
}

impl Bounds {
    pub fn from_samples(samples: &[Sample]) -> Self {
        Self::from_points(samples.iter().map(|s| (s.timestamp, s.value)))
    }

    /// Bounds over bucket starts and bucket averages
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        Self::from_points(buckets.iter().map(|b| (b.bucket_start, b.avg)))
    }

    fn from_points(points: impl Iterator<Item = (i64, f64)>) -> Self {
        let mut bounds: Option<Bounds> = None;
        for (time, value) in points {
            let b = bounds.get_or_insert(Bounds {
                min_value: value,
                max_value: value,
                min_time: time,
                max_time: time,
            });
            b.min_value = b.min_value.min(value);
            b.max_value = b.max_value.max(value);
            b.min_time = b.min_time.min(time);
            b.max_time = b.max_time.max(time);
        }
        bounds.unwrap_or_default()
    }

    pub fn value_span(&self) -> f64 {
        self.max_value - self.min_value
    }
}

#[inline]
fn normalize(offset: f64, range: f64) -> f64 {
    let range = if range == 0.0 { 1.0 } else { range };
    offset / range
}

/// Position along an "up" axis: `min` lands on `axis_length - padding`,
/// `max` on `padding`. A zero-width range is treated as width 1.
#[inline]
pub fn map_value_to_axis(value: f64, min: f64, max: f64, axis_length: f64, padding: f64) -> f64 {
    let normalized = normalize(value - min, max - min);
    axis_length - padding - normalized * (axis_length - 2.0 * padding)
}

/// Position along the time axis: `min` lands on `padding`, `max` on
/// `axis_length - padding`. Offsets are taken in f64 so that no pair of
/// timestamps can overflow.
#[inline]
pub fn map_time_to_axis(timestamp: i64, min: i64, max: i64, axis_length: f64, padding: f64) -> f64 {
    let normalized = normalize(timestamp as f64 - min as f64, max as f64 - min as f64);
    padding + normalized * (axis_length - 2.0 * padding)
}
