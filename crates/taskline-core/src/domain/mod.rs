//! Domain model (tasks, ids, configuration, errors).

pub mod config;
pub mod errors;
pub mod ids;
pub mod task;

pub use self::config::{PipelineConfig, SimulationProfile};
pub use self::errors::{BoxError, ConfigError, PipelineError, QueueFull};
pub use self::ids::{ProcessorId, TaskId};
pub use self::task::Task;
