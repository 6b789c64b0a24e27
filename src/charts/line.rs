use super::axes::draw_axes;
use super::registry::ChartRegistration;
use super::{Chart, ChartConfig, Viewport};
use crate::core::{Color, DrawSurface, Point, Sample};
use crate::transform::{map_time_to_axis, map_value_to_axis, Bounds};

pub const DEFAULT_COLOR: Color = Color::rgb(0x3b, 0x82, 0xf6);

/// Every sample of the snapshot joined into one polyline
pub struct LineChart {
    title: String,
    viewport: Viewport,
    color: Color,
    bounds: Bounds,
    path: Vec<Point>,
}

impl LineChart {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            title: config.title_or("Line Chart"),
            viewport: config.viewport(),
            color: config.color.unwrap_or(DEFAULT_COLOR),
            bounds: Bounds::default(),
            path: Vec::new(),
        }
    }

    fn boxed(config: &ChartConfig) -> Box<dyn Chart> {
        Box::new(Self::new(config))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl Chart for LineChart {
    fn kind(&self) -> &'static str {
        "line"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prepare(&mut self, samples: &[Sample]) {
        self.bounds = Bounds::from_samples(samples);
        let Viewport {
            width,
            height,
            padding,
        } = self.viewport;
        let b = self.bounds;

        // reuse last frame's allocation
        self.path.clear();
        self.path.extend(samples.iter().map(|s| {
            Point::new(
                map_time_to_axis(s.timestamp, b.min_time, b.max_time, width, padding),
                map_value_to_axis(s.value, b.min_value, b.max_value, height, padding),
            )
        }));
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        draw_axes(surface, self.viewport, self.bounds.min_value, self.bounds.max_value);
        if !self.path.is_empty() {
            surface.stroke_path(&self.path, self.color, 2.0);
        }
    }

    fn element_count(&self) -> usize {
        self.path.len()
    }
}

inventory::submit! {
    ChartRegistration { kind: "line", factory: LineChart::boxed }
}
