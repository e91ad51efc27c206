use super::{
  ArcShared, ChannelEffect, ChannelExecutor, ChannelExit, ChannelState, DynValue, ExecutorId, SpinSyncMutex,
  UpstreamSignal,
};

/// Shared reference to an executor.
///
/// Upstreams, pipe left sides and composition children are reached through handles. Each
/// method locks the executor for the duration of one call only.
#[derive(Clone)]
pub struct ExecutorHandle {
  id:    ExecutorId,
  inner: ArcShared<SpinSyncMutex<ChannelExecutor>>,
}

impl ExecutorHandle {
  /// Wraps `executor` in a new handle.
  #[must_use]
  pub fn new(executor: ChannelExecutor) -> Self {
    Self { id: executor.id(), inner: ArcShared::new(SpinSyncMutex::new(executor)) }
  }

  /// Returns the id of the wrapped executor.
  #[must_use]
  pub const fn id(&self) -> ExecutorId {
    self.id
  }

  /// Returns true when both handles refer to the same executor.
  #[must_use]
  pub fn ptr_eq(&self, other: &Self) -> bool {
    self.inner.ptr_eq(&other.inner)
  }

  /// Runs `f` with exclusive access to the executor.
  pub fn with<R>(&self, f: impl FnOnce(&mut ChannelExecutor) -> R) -> R {
    f(&mut self.inner.lock())
  }

  /// See [`ChannelExecutor::step`].
  #[must_use]
  pub fn step(&self) -> ChannelState {
    self.inner.lock().step()
  }

  /// See [`ChannelExecutor::take_emitted`].
  #[must_use]
  pub fn take_emitted(&self) -> Option<DynValue> {
    self.inner.lock().take_emitted()
  }

  /// See [`ChannelExecutor::take_done`].
  #[must_use]
  pub fn take_done(&self) -> Option<ChannelExit> {
    self.inner.lock().take_done()
  }

  /// See [`ChannelExecutor::resume_read`].
  pub fn resume_read(&self, signal: UpstreamSignal) {
    self.inner.lock().resume_read(signal);
  }

  /// See [`ChannelExecutor::resume_effect`].
  pub fn resume_effect(&self, exit: ChannelExit) {
    self.inner.lock().resume_effect(exit);
  }

  /// See [`ChannelExecutor::cancel_with`].
  pub fn cancel_with(&self, exit: ChannelExit) {
    self.inner.lock().cancel_with(exit);
  }

  /// See [`ChannelExecutor::close`].
  #[must_use]
  pub fn close(&self, exit: &ChannelExit) -> Option<ChannelEffect> {
    self.inner.lock().close(exit)
  }
}

impl core::fmt::Debug for ExecutorHandle {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ExecutorHandle").field("id", &self.id).finish()
  }
}
