pub mod dashboard;
pub mod frame;
pub mod generation;
pub mod scheduler;
pub mod state;
pub mod task;

pub use dashboard::{recording_slots, Dashboard};
pub use frame::{FrameClock, FrameSignal, FrameTick};
pub use generation::GenerationTask;
pub use scheduler::{ChartSlot, FrameReport, RenderScheduler, Renderer};
pub use state::SchedulerState;
pub use task::TaskHandle;
