use alloc::sync::Arc;

use tokio::runtime::{Handle, TryCurrentError};

use super::TokioTaskHandle;
use crate::core::{ArcShared, BoxFuture, ChannelRuntimeConfig, TaskHandle, TaskSpawner};

#[cfg(test)]
mod tests;

/// [`TaskSpawner`] forking tasks onto a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioTaskSpawner {
  handle: Handle,
}

impl TokioTaskSpawner {
  /// Creates a spawner for the runtime behind `handle`.
  #[must_use]
  pub const fn new(handle: Handle) -> Self {
    Self { handle }
  }

  /// Creates a spawner for the runtime the caller runs on.
  ///
  /// # Errors
  ///
  /// Returns [`TryCurrentError`] when called outside a tokio runtime.
  pub fn try_current() -> Result<Self, TryCurrentError> {
    Handle::try_current().map(Self::new)
  }
}

impl TaskSpawner for TokioTaskSpawner {
  fn spawn(&self, task: BoxFuture<()>) -> ArcShared<dyn TaskHandle> {
    let join = self.handle.spawn(task);
    let handle: Arc<dyn TaskHandle> = Arc::new(TokioTaskHandle::new(join.abort_handle()));
    ArcShared::from(handle)
  }
}

/// Builds a runtime configuration whose spawner forks onto the current tokio runtime.
///
/// # Errors
///
/// Returns [`TryCurrentError`] when called outside a tokio runtime.
pub fn tokio_runtime_config() -> Result<ChannelRuntimeConfig, TryCurrentError> {
  let spawner: Arc<dyn TaskSpawner> = Arc::new(TokioTaskSpawner::try_current()?);
  Ok(ChannelRuntimeConfig::new().with_spawner(ArcShared::from(spawner)))
}
