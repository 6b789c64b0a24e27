use super::axes::draw_axes;
use super::registry::ChartRegistration;
use super::{Chart, ChartConfig, Viewport};
use crate::core::{Color, DrawSurface, Point, Sample};
use crate::transform::{downsample, map_time_to_axis, map_value_to_axis, Bounds};

pub const DEFAULT_COLOR: Color = Color::rgb(0xf5, 0x9e, 0x0b);
const POINT_ALPHA: f32 = 0.6;

/// Stride-sampled points; exact positions matter less than visual density here
pub struct ScatterPlot {
    title: String,
    viewport: Viewport,
    color: Color,
    max_points: usize,
    radius: f64,
    bounds: Bounds,
    points: Vec<Point>,
    source_len: usize,
}

impl ScatterPlot {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            title: config.title_or("Scatter Plot"),
            viewport: config.viewport(),
            color: config.color.unwrap_or(DEFAULT_COLOR).with_alpha(POINT_ALPHA),
            max_points: config.max_points,
            radius: config.point_radius,
            bounds: Bounds::default(),
            points: Vec::new(),
            source_len: 0,
        }
    }

    fn boxed(config: &ChartConfig) -> Box<dyn Chart> {
        Box::new(Self::new(config))
    }

    /// Length of the snapshot the points were sampled from
    pub fn source_len(&self) -> usize {
        self.source_len
    }
}

impl Chart for ScatterPlot {
    fn kind(&self) -> &'static str {
        "scatter"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prepare(&mut self, samples: &[Sample]) {
        let sampled = downsample(samples, self.max_points);
        self.source_len = samples.len();
        self.bounds = Bounds::from_samples(&sampled);

        let Viewport {
            width,
            height,
            padding,
        } = self.viewport;
        let b = self.bounds;
        self.points.clear();
        self.points.extend(sampled.iter().map(|s| {
            Point::new(
                map_time_to_axis(s.timestamp, b.min_time, b.max_time, width, padding),
                map_value_to_axis(s.value, b.min_value, b.max_value, height, padding),
            )
        }));
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.points.is_empty() {
            return;
        }
        draw_axes(surface, self.viewport, self.bounds.min_value, self.bounds.max_value);
        for point in &self.points {
            surface.fill_circle(*point, self.radius, self.color);
        }
    }

    fn element_count(&self) -> usize {
        self.points.len()
    }
}

inventory::submit! {
    ChartRegistration { kind: "scatter", factory: ScatterPlot::boxed }
}
