pub mod axes;
pub mod bar;
pub mod heatmap;
pub mod line;
pub mod registry;
pub mod scatter;

pub use bar::BarChart;
pub use heatmap::Heatmap;
pub use line::LineChart;
pub use registry::{create_chart, registered_kinds, ChartFactory, ChartRegistration};
pub use scatter::ScatterPlot;

use crate::core::{Color, DrawSurface, Sample};
use serde::{Deserialize, Serialize};

/// One projection of the sample set onto its own canvas.
///
/// `prepare` derives everything the chart needs from the frame's snapshot;
/// `draw` only turns that into draw calls. The renderer clears the surface
/// before `draw`, so every frame is a full redraw.
pub trait Chart: Send {
    fn kind(&self) -> &'static str;

    fn title(&self) -> &str;

    fn prepare(&mut self, samples: &[Sample]);

    fn draw(&self, surface: &mut dyn DrawSurface);

    /// Number of data elements drawn by the last `draw`
    fn element_count(&self) -> usize;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub kind: String,
    pub title: Option<String>,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub color: Option<Color>,
    /// Bar chart bucket width
    pub aggregation_period_ms: u64,
    /// Scatter plot point budget
    pub max_points: usize,
    pub point_radius: f64,
    /// Heatmap cell edge
    pub cell_size: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: "line".to_string(),
            title: None,
            width: 800.0,
            height: 400.0,
            padding: 40.0,
            color: None,
            aggregation_period_ms: 60_000,
            max_points: 1_000,
            point_radius: 3.0,
            cell_size: 10.0,
        }
    }
}

impl ChartConfig {
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            padding: self.padding,
        }
    }

    pub fn title_or(&self, fallback: &str) -> String {
        self.title.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Canvas geometry shared by the coordinate mapping of one chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn plot_width(&self) -> f64 {
        (self.width - 2.0 * self.padding).max(0.0)
    }
}
