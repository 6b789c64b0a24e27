use crate::core::{Category, Sample};
use serde::{Deserialize, Serialize};

/// Slice of rows that is actually materialised, plus the placeholder space
/// that stands in for everything above and below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibleRange {
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub offset_before: f64,
    pub offset_after: f64,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// `[floor(offset / height), min(start + viewport + 1, total))`, always
/// within `0..=total`
pub fn visible_range(
    scroll_offset: f64,
    item_height: f64,
    viewport_item_count: usize,
    total_count: usize,
) -> VisibleRange {
    let start = if item_height > 0.0 && scroll_offset > 0.0 {
        let index = (scroll_offset / item_height).floor();
        if index >= total_count as f64 {
            total_count
        } else {
            index as usize
        }
    } else {
        0
    };
    let end = start
        .saturating_add(viewport_item_count)
        .saturating_add(1)
        .min(total_count);
    let item_height = item_height.max(0.0);

    VisibleRange {
        start,
        end,
        offset_before: start as f64 * item_height,
        offset_after: (total_count - end) as f64 * item_height,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub index: usize,
    pub timestamp: i64,
    pub value: String,
    pub category: Category,
}

impl TableRow {
    fn from_sample(index: usize, sample: &Sample) -> Self {
        Self {
            index,
            timestamp: sample.timestamp,
            value: format!("{:.2}", sample.value),
            category: sample.category,
        }
    }
}

/// Row geometry of the sample table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualWindow {
    pub item_height: f64,
    pub viewport_items: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self {
            item_height: 35.0,
            viewport_items: 12,
        }
    }
}

impl VirtualWindow {
    pub fn range(&self, scroll_offset: f64, total_count: usize) -> VisibleRange {
        visible_range(scroll_offset, self.item_height, self.viewport_items, total_count)
    }

    /// Materialises only the rows inside the visible range
    pub fn rows(&self, scroll_offset: f64, samples: &[Sample]) -> (VisibleRange, Vec<TableRow>) {
        let range = self.range(scroll_offset, samples.len());
        let rows = samples[range.start..range.end]
            .iter()
            .enumerate()
            .map(|(i, sample)| TableRow::from_sample(range.start + i, sample))
            .collect();
        (range, rows)
    }

    /// Height of the scrollable content if every row were rendered
    pub fn content_height(&self, total_count: usize) -> f64 {
        total_count as f64 * self.item_height
    }
}
