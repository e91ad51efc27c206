//! Externally-managed resource scope.

use alloc::{boxed::Box, vec::Vec};

use super::{
  ArcShared, BoxFuture, Cause, ChannelEffect, ChannelExit, Defect, Environment, FinalizerFn, LOG_TARGET, SpinSyncMutex,
  finalizer_batch::FinalizerBatch, unit,
};

#[cfg(test)]
mod tests;

struct ScopeState {
  finalizers: Vec<FinalizerFn>,
  closed:     bool,
}

/// Scope that outlives the programs run inside it.
///
/// [`ChannelRunner::run_scoped`](super::ChannelRunner::run_scoped) hands a program's cleanup
/// to the scope instead of running it immediately. [`ResourceScope::close`] runs every
/// registered finalizer once, newest first, keeping every failure.
#[derive(Clone)]
pub struct ResourceScope {
  state: ArcShared<SpinSyncMutex<ScopeState>>,
}

impl ResourceScope {
  /// Creates an open scope.
  #[must_use]
  pub fn new() -> Self {
    Self { state: ArcShared::new(SpinSyncMutex::new(ScopeState { finalizers: Vec::new(), closed: false })) }
  }

  /// Registers `finalizer`.
  ///
  /// # Errors
  ///
  /// Returns the finalizer back when the scope is already closed.
  pub fn add_finalizer(&self, finalizer: FinalizerFn) -> Result<(), FinalizerFn> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(finalizer);
    }
    state.finalizers.push(finalizer);
    Ok(())
  }

  /// Registers a finalizer built from a closure.
  ///
  /// # Errors
  ///
  /// Returns the finalizer back when the scope is already closed.
  pub fn add<F>(&self, finalizer: F) -> Result<(), FinalizerFn>
  where
    F: FnOnce(&ChannelExit) -> ChannelEffect + Send + 'static, {
    self.add_finalizer(Box::new(finalizer))
  }

  /// Returns the number of pending finalizers.
  #[must_use]
  pub fn len(&self) -> usize {
    self.state.lock().finalizers.len()
  }

  /// Returns true when no finalizer is pending.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns true once the scope was closed.
  #[must_use]
  pub fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  /// Closes the scope, running its finalizers with `exit` in reverse registration order.
  ///
  /// Closing an already closed scope does nothing.
  pub fn close(&self, exit: &ChannelExit) -> BoxFuture<ChannelExit> {
    let finalizers = {
      let mut state = self.state.lock();
      state.closed = true;
      core::mem::take(&mut state.finalizers)
    };
    let effects: Vec<ChannelEffect> = finalizers
      .into_iter()
      .rev()
      .map(|finalizer| match Defect::capture(|| finalizer(exit)) {
        | Ok(effect) => effect,
        | Err(defect) => ChannelEffect::fail_cause(Cause::die(defect)),
      })
      .collect();
    tracing::debug!(target: LOG_TARGET, finalizers = effects.len(), "closing resource scope");
    Box::pin(async move {
      if effects.is_empty() {
        return Ok(unit());
      }
      FinalizerBatch::new(effects).into_effect().run(Environment::empty()).await
    })
  }
}

impl Default for ResourceScope {
  fn default() -> Self {
    Self::new()
  }
}

impl core::fmt::Debug for ResourceScope {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let state = self.state.lock();
    f.debug_struct("ResourceScope").field("pending", &state.finalizers.len()).field("closed", &state.closed).finish()
  }
}
