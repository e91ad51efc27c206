//! Program runner entry points.

use alloc::{boxed::Box, vec::Vec};

use super::{
  Cause, ChannelEffect, ChannelExit, ChannelProgram, ChannelPuller, ChannelRuntimeConfig, DynValue, FinalizerFn,
  LOG_TARGET, PullOutcome, ResourceScope, combine_exits,
};


/// Drives programs to completion with a shared runtime configuration.
#[derive(Clone, Debug, Default)]
pub struct ChannelRunner {
  config: ChannelRuntimeConfig,
}

impl ChannelRunner {
  /// Creates a runner using `config` for every program it runs.
  #[must_use]
  pub const fn new(config: ChannelRuntimeConfig) -> Self {
    Self { config }
  }

  /// Returns the runtime configuration.
  #[must_use]
  pub const fn config(&self) -> &ChannelRuntimeConfig {
    &self.config
  }

  /// Runs `program` to completion, discarding its outputs, then runs its cleanup.
  ///
  /// The program's value survives a successful cleanup; failing cleanup is combined with
  /// the program's own outcome.
  pub async fn run(&self, program: ChannelProgram) -> ChannelExit {
    self.run_with(program, |_| {}).await
  }

  /// Runs `program` to completion, handing every output to `on_output`, then runs its
  /// cleanup.
  pub async fn run_with<F>(&self, program: ChannelProgram, mut on_output: F) -> ChannelExit
  where
    F: FnMut(DynValue), {
    let mut puller = ChannelPuller::new(program, &self.config);
    let exit = drain(&mut puller, &mut on_output).await;
    let cleanup = puller.close(&exit);
    let cleanup = cleanup.await;
    combine_exits(exit, cleanup)
  }

  /// Runs `program` to completion, collecting its outputs alongside its final value.
  ///
  /// # Errors
  ///
  /// Returns the combined cause when the program or its cleanup fails.
  pub async fn run_collect(&self, program: ChannelProgram) -> Result<(Vec<DynValue>, DynValue), Cause> {
    let mut outputs = Vec::new();
    let value = self.run_with(program, |value| outputs.push(value)).await?;
    Ok((outputs, value))
  }

  /// Runs `program` to completion, leaving its cleanup to `scope`.
  ///
  /// The cleanup runs when the scope closes, with the scope's outcome. When the scope is
  /// already closed the cleanup runs immediately.
  pub async fn run_scoped(&self, program: ChannelProgram, scope: &ResourceScope) -> ChannelExit {
    self.run_scoped_with(program, scope, |_| {}).await
  }

  /// Like [`ChannelRunner::run_scoped`], handing every output to `on_output`.
  pub async fn run_scoped_with<F>(
    &self,
    program: ChannelProgram,
    scope: &ResourceScope,
    mut on_output: F,
  ) -> ChannelExit
  where
    F: FnMut(DynValue), {
    let mut puller = ChannelPuller::new(program, &self.config);
    let exit = drain(&mut puller, &mut on_output).await;
    let executor = puller.executor().clone();
    let environment = self.config.environment().clone();
    let finalizer: FinalizerFn = Box::new(move |scope_exit: &ChannelExit| match executor.close(scope_exit) {
      | Some(effect) => effect.provide(environment),
      | None => ChannelEffect::unit(),
    });
    match scope.add_finalizer(finalizer) {
      | Ok(()) => exit,
      | Err(_) => {
        tracing::debug!(target: LOG_TARGET, executor = puller.executor().id().value(), "scope already closed");
        let cleanup = puller.close(&exit);
        let cleanup = cleanup.await;
        combine_exits(exit, cleanup)
      },
    }
  }
}

async fn drain<F>(puller: &mut ChannelPuller, on_output: &mut F) -> ChannelExit
where
  F: FnMut(DynValue), {
  loop {
    match puller.pull().await {
      | PullOutcome::Element(value) => on_output(value),
      | PullOutcome::Done(exit) => return exit,
    }
  }
}
