pub mod virtual_window;

pub use virtual_window::{visible_range, TableRow, VirtualWindow, VisibleRange};
