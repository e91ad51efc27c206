use super::{ArcShared, Environment, ExecutorHandle, FailureContinuation, FinalizerFn, SuccessContinuation, TaskHandle};

/// Entry of an executor's continuation stack.
pub(crate) enum Continuation {
  /// Branches taken when the program below settles.
  Fold { on_success: SuccessContinuation, on_failure: FailureContinuation },
  /// Cleanup that runs whatever the outcome.
  Finalizer(Finalizer),
}

/// Cleanup actions an executor resolves against its own state when popped.
pub(crate) enum Finalizer {
  /// User release built from the outcome.
  Release(FinalizerFn),
  /// Restores the input replaced by a pipe and closes the pipe's left side.
  RestoreInput { previous: Option<ExecutorHandle> },
  /// Restores the environment replaced by `Provide`.
  RestoreEnvironment { previous: Environment },
  /// Interrupts a bridge task and restores the input it was draining.
  CancelBridge { task: ArcShared<dyn TaskHandle>, previous: Option<ExecutorHandle> },
}
