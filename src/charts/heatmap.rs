use super::registry::ChartRegistration;
use super::{Chart, ChartConfig};
use crate::core::{Color, DrawSurface, Rect, Sample};
use crate::transform::{density_grid, DensityGrid};

/// Sample density over (position in buffer x value), blue = sparse, red = dense
pub struct Heatmap {
    title: String,
    cell_size: f64,
    rows: usize,
    cols: usize,
    grid: DensityGrid,
}

impl Heatmap {
    pub fn new(config: &ChartConfig) -> Self {
        let cell_size = config.cell_size.max(1.0);
        let rows = (config.height / cell_size).floor().max(0.0) as usize;
        let cols = (config.width / cell_size).floor().max(0.0) as usize;
        Self {
            title: config.title_or("Heatmap"),
            cell_size,
            rows,
            cols,
            grid: DensityGrid::empty(rows, cols),
        }
    }

    fn boxed(config: &ChartConfig) -> Box<dyn Chart> {
        Box::new(Self::new(config))
    }

    pub fn grid(&self) -> &DensityGrid {
        &self.grid
    }

    pub fn cell_color(count: u32, max_count: u32) -> Color {
        let normalized = if max_count > 0 {
            count as f64 / max_count as f64
        } else {
            0.0
        };
        Color::from_hsl((1.0 - normalized) * 240.0, 100.0, 50.0 - normalized * 30.0)
    }
}

impl Chart for Heatmap {
    fn kind(&self) -> &'static str {
        "heatmap"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prepare(&mut self, samples: &[Sample]) {
        self.grid = density_grid(samples, self.cols, self.rows);
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.grid.total() == 0 {
            return;
        }
        let max_count = self.grid.max_count();
        for row in 0..self.rows {
            // row 0 holds the lowest values, drawn at the bottom
            let y = (self.rows - 1 - row) as f64 * self.cell_size;
            for col in 0..self.cols {
                let color = Self::cell_color(self.grid.get(row, col), max_count);
                let rect = Rect::new(col as f64 * self.cell_size, y, self.cell_size, self.cell_size);
                surface.fill_rect(rect, color);
            }
        }
    }

    fn element_count(&self) -> usize {
        if self.grid.total() == 0 {
            0
        } else {
            self.rows * self.cols
        }
    }
}

inventory::submit! {
    ChartRegistration { kind: "heatmap", factory: Heatmap::boxed }
}
