/// Handle to a background task forked on behalf of an executor.
pub trait TaskHandle: Send + Sync {
  /// Requests interruption of the task. Calling it more than once has no further effect.
  fn interrupt(&self);

  /// Returns true when the task has run to completion or was interrupted.
  fn is_finished(&self) -> bool;
}
