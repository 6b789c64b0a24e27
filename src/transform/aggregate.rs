use crate::core::Sample;
use serde::Serialize;
use std::borrow::Cow;

/// Summary of all samples whose timestamps fall in one fixed-width window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub bucket_start: i64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Start of the window containing `timestamp`, floored towards negative
/// infinity and saturated at `i64::MIN`
#[inline]
pub fn bucket_key(timestamp: i64, period_ms: u64) -> i64 {
    let period = period_ms.clamp(1, i64::MAX as u64) as i64;
    timestamp.div_euclid(period).saturating_mul(period)
}

/// Groups samples into `period_ms` windows, ascending by window start.
///
/// The result does not depend on input order: entries are sorted by
/// (window, value) before reduction, so even the float sums are identical
/// for any permutation of the same samples. A zero period is treated as 1 ms.
pub fn bucketize(samples: &[Sample], period_ms: u64) -> Vec<Bucket> {
    let mut keyed: Vec<(i64, f64)> = samples
        .iter()
        .map(|s| (bucket_key(s.timestamp, period_ms), s.value))
        .collect();
    keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut sum = 0.0;
    for (key, value) in keyed {
        if let Some(bucket) = buckets.last_mut().filter(|b| b.bucket_start == key) {
            bucket.count += 1;
            bucket.min = bucket.min.min(value);
            bucket.max = bucket.max.max(value);
            sum += value;
            continue;
        }

        if let Some(done) = buckets.last_mut() {
            done.avg = sum / done.count as f64;
        }
        buckets.push(Bucket {
            bucket_start: key,
            count: 1,
            min: value,
            max: value,
            avg: value,
        });
        sum = value;
    }
    if let Some(last) = buckets.last_mut() {
        last.avg = sum / last.count as f64;
    }

    buckets
}

/// Stride sampling for render-cost control. Lossy by design: it keeps every
/// `ceil(len / target_count)`-th item starting with the first, and returns the
/// input untouched when it already fits.
pub fn downsample<T: Clone>(items: &[T], target_count: usize) -> Cow<'_, [T]> {
    if items.len() <= target_count {
        return Cow::Borrowed(items);
    }
    if target_count == 0 {
        return Cow::Owned(Vec::new());
    }

    let stride = items.len().div_ceil(target_count);
    Cow::Owned(items.iter().step_by(stride).cloned().collect())
}

/// Sample counts on a (time position x value) grid.
///
/// Row 0 holds the lowest values; columns follow the order of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<u32>,
    max_count: u32,
}

impl DensityGrid {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
            max_count: 0,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        if row >= self.rows || col >= self.cols {
            return 0;
        }
        self.cells[row * self.cols + col]
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    fn bump(&mut self, row: usize, col: usize) {
        let cell = &mut self.cells[row * self.cols + col];
        *cell += 1;
        self.max_count = self.max_count.max(*cell);
    }
}

pub fn density_grid(samples: &[Sample], cols: usize, rows: usize) -> DensityGrid {
    let mut grid = DensityGrid::empty(rows, cols);
    if samples.is_empty() || rows == 0 || cols == 0 {
        return grid;
    }

    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let len = samples.len() as f64;

    for (index, sample) in samples.iter().enumerate() {
        let col = ((index as f64 / len) * cols as f64).floor() as usize;
        let normalized = (sample.value - min) / range;
        let row = (normalized * (rows - 1) as f64).floor();
        if row.is_finite() && row >= 0.0 && (row as usize) < rows && col < cols {
            grid.bump(row as usize, col);
        }
    }

    grid
}
