pub mod tick_guard;

pub use tick_guard::{ErrorCallback, TickGuard};
