use super::Viewport;
use crate::core::{Color, DrawSurface, Point};
use crate::transform::map_value_to_axis;

const LABEL_STEPS: u32 = 3;

/// Y and X axis lines plus evenly spaced value labels on the left margin
pub fn draw_axes(surface: &mut dyn DrawSurface, viewport: Viewport, min_value: f64, max_value: f64) {
    let Viewport {
        width,
        height,
        padding,
    } = viewport;

    surface.stroke_path(
        &[Point::new(padding, padding), Point::new(padding, height - padding)],
        Color::AXIS,
        1.0,
    );
    surface.stroke_path(
        &[
            Point::new(padding, height - padding),
            Point::new(width - padding, height - padding),
        ],
        Color::AXIS,
        1.0,
    );

    let step = (max_value - min_value) / LABEL_STEPS as f64;
    for i in 0..=LABEL_STEPS {
        let value = min_value + step * i as f64;
        let y = map_value_to_axis(value, min_value, max_value, height, padding);
        surface.draw_text(&format!("{:.0}", value), Point::new(5.0, y + 5.0), Color::LABEL);
    }
}
