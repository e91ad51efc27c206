use super::{ChannelExit, ReleaseFactory, subexecutor_state::SubexecutorState};

/// What an executor does with the outcome of the effect it handed to its driver.
pub(crate) enum EffectContinuation {
  /// Settle the current program with the outcome.
  Settle,
  /// Register the release for an acquired resource and emit it.
  BracketAcquired(ReleaseFactory),
  /// Settle again with `exit` once a finalizer batch ran.
  ResettleAfterFinalizers(ChannelExit),
  /// Resume the sub-executor once a child has been closed.
  ResumeSubexecutor(SubexecutorState),
  /// Settle the finished sub-executor with `exit` once its executors have been closed.
  FinishSubexecutor(ChannelExit),
}
