pub mod buffers;
pub mod charts;
pub mod config;
pub mod core;
pub mod engine;
pub mod observability;
pub mod resilience;
pub mod sources;
pub mod table;
pub mod transform;

pub use config::DashboardConfig;
pub use engine::Dashboard;
