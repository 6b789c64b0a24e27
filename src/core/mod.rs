pub mod sample;
pub mod surface;

pub use sample::{Category, Sample};
pub use surface::{Color, DrawCommand, DrawSurface, Point, Rect, RecordingSurface};
