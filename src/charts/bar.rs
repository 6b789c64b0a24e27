use super::axes::draw_axes;
use super::registry::ChartRegistration;
use super::{Chart, ChartConfig, Viewport};
use crate::core::{Color, DrawSurface, Rect, Sample};
use crate::transform::{bucketize, map_value_to_axis, Bounds, Bucket};

pub const DEFAULT_COLOR: Color = Color::rgb(0x10, 0xb9, 0x81);
const MIN_BAR_WIDTH: f64 = 5.0;

/// One bar per time bucket, height = bucket average
pub struct BarChart {
    title: String,
    viewport: Viewport,
    color: Color,
    period_ms: u64,
    buckets: Vec<Bucket>,
    bounds: Bounds,
}

impl BarChart {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            title: config.title_or("Bar Chart"),
            viewport: config.viewport(),
            color: config.color.unwrap_or(DEFAULT_COLOR),
            period_ms: config.aggregation_period_ms,
            buckets: Vec::new(),
            bounds: Bounds::default(),
        }
    }

    fn boxed(config: &ChartConfig) -> Box<dyn Chart> {
        Box::new(Self::new(config))
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bar_rects(&self) -> Vec<Rect> {
        let Viewport { height, padding, .. } = self.viewport;
        let n = self.buckets.len();
        if n == 0 {
            return Vec::new();
        }

        let spacing = self.viewport.plot_width() / n as f64;
        let bar_width = (spacing * 0.8).max(MIN_BAR_WIDTH);
        let b = self.bounds;

        self.buckets
            .iter()
            .enumerate()
            .map(|(index, bucket)| {
                let x = padding + index as f64 * spacing + spacing / 2.0 - bar_width / 2.0;
                let y = map_value_to_axis(bucket.avg, b.min_value, b.max_value, height, padding);
                Rect::new(x, y, bar_width, height - padding - y)
            })
            .collect()
    }
}

impl Chart for BarChart {
    fn kind(&self) -> &'static str {
        "bar"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prepare(&mut self, samples: &[Sample]) {
        self.buckets = bucketize(samples, self.period_ms);
        self.bounds = Bounds::from_buckets(&self.buckets);
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.buckets.is_empty() {
            return;
        }
        draw_axes(surface, self.viewport, self.bounds.min_value, self.bounds.max_value);
        for rect in self.bar_rects() {
            surface.fill_rect(rect, self.color);
        }
    }

    fn element_count(&self) -> usize {
        self.buckets.len()
    }
}

inventory::submit! {
    ChartRegistration { kind: "bar", factory: BarChart::boxed }
}
