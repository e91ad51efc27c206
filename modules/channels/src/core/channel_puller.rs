//! Downstream pull handle.

use alloc::boxed::Box;

use super::{
  BoxFuture, Cause, ChannelExecutor, ChannelExit, ChannelProgram, ChannelRuntimeConfig, Environment, ExecutorHandle,
  PullOutcome, UpstreamSignal, pull_upstream, unit,
};


/// Pulls the outputs of a program one at a time.
///
/// The puller owns its executor. Once the consumer stops pulling it must call
/// [`ChannelPuller::close`] (or [`ChannelPuller::interrupt`]) so the program's finalizers
/// run; both are safe to call more than once.
pub struct ChannelPuller {
  executor:    ExecutorHandle,
  environment: Environment,
}

impl ChannelPuller {
  /// Creates a puller for `program`.
  #[must_use]
  pub fn new(program: ChannelProgram, config: &ChannelRuntimeConfig) -> Self {
    Self {
      executor:    ExecutorHandle::new(ChannelExecutor::new(program, config)),
      environment: config.environment().clone(),
    }
  }

  /// Returns the handle of the executor driving the program.
  #[must_use]
  pub const fn executor(&self) -> &ExecutorHandle {
    &self.executor
  }

  /// Pulls the next output or the final outcome.
  pub async fn pull(&mut self) -> PullOutcome {
    match pull_upstream(self.executor.clone()).await {
      | UpstreamSignal::Emit(value) => PullOutcome::Element(value),
      | UpstreamSignal::Done(exit) => PullOutcome::Done(exit),
    }
  }

  /// Runs every pending finalizer with `exit` and returns their combined outcome.
  ///
  /// The cleanup is collected when this is called; the returned future only runs it.
  pub fn close(&mut self, exit: &ChannelExit) -> BoxFuture<ChannelExit> {
    let cleanup = self.executor.close(exit);
    let environment = self.environment.clone();
    Box::pin(async move {
      match cleanup {
        | Some(effect) => effect.run(environment).await,
        | None => Ok(unit()),
      }
    })
  }

  /// Cancels the program and runs its finalizers with an interruption.
  pub async fn interrupt(&mut self) -> ChannelExit {
    let exit: ChannelExit = Err(Cause::Interrupt);
    self.executor.cancel_with(Err(Cause::Interrupt));
    let cleanup = self.close(&exit);
    cleanup.await
  }
}

impl core::fmt::Debug for ChannelPuller {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChannelPuller").field("executor", &self.executor.id()).finish()
  }
}
