use super::{FailureContinuation, SuccessContinuation};

/// Read an executor is waiting on.
pub(crate) enum PendingRead {
  /// A `Read` program waiting on the executor's input.
  Program { on_input: SuccessContinuation, on_failure: FailureContinuation, on_done: SuccessContinuation },
  /// The sub-executor waiting on its upstream.
  Upstream,
  /// The sub-executor waiting on its current child.
  Child,
}
