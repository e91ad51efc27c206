//! Tokio-backed runtime for the channel engine.

/// Two-sided merge driver.
mod merge_with;
/// Tokio task handle.
mod tokio_task_handle;
/// Tokio task spawner.
mod tokio_task_spawner;
/// Timeouts on effects.
mod with_timeout;

pub use merge_with::merge_with;
pub use tokio_task_handle::TokioTaskHandle;
pub use tokio_task_spawner::{TokioTaskSpawner, tokio_runtime_config};
pub use with_timeout::{timeout_or_else, with_timeout};
