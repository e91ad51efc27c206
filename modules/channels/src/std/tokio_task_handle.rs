use tokio::task::AbortHandle;

use crate::core::TaskHandle;

/// [`TaskHandle`] backed by a tokio abort handle.
pub struct TokioTaskHandle {
  abort: AbortHandle,
}

impl TokioTaskHandle {
  /// Wraps `abort`.
  #[must_use]
  pub const fn new(abort: AbortHandle) -> Self {
    Self { abort }
  }
}

impl TaskHandle for TokioTaskHandle {
  fn interrupt(&self) {
    self.abort.abort();
  }

  fn is_finished(&self) -> bool {
    self.abort.is_finished()
  }
}
