pub mod collector;
pub mod memory;
pub mod metrics;
pub mod monitor;

pub use collector::{MetricsCollector, TaskSnapshot};
pub use memory::{MemoryProbe, NoMemoryProbe, ProcessMemoryProbe};
pub use metrics::{FrameMetrics, RenderTimings, TaskMetrics};
pub use monitor::{compute_fps, FpsCounter, MetricsObserver, MonitorConfig, PerformanceMonitor};
