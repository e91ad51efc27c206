use super::{BoxFuture, ChannelExit, ExecutorHandle};

/// Outcome of one [`ChannelExecutor::step`](super::ChannelExecutor::step).
pub enum ChannelState {
  /// The executor finished. Its outcome is available through `take_done`.
  Done,
  /// The executor produced an output, available through `take_emitted`.
  Emit,
  /// The executor needs this effect to complete. Its outcome must be handed back through
  /// `resume_effect` before stepping again.
  Effect(BoxFuture<ChannelExit>),
  /// The executor needs one signal from the given upstream, handed back through
  /// `resume_read` before stepping again.
  Read(ExecutorHandle),
}

impl ChannelState {
  /// Returns true for [`ChannelState::Done`].
  #[must_use]
  pub const fn is_done(&self) -> bool {
    matches!(self, Self::Done)
  }
}

impl core::fmt::Debug for ChannelState {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::Done => f.write_str("Done"),
      | Self::Emit => f.write_str("Emit"),
      | Self::Effect(_) => f.write_str("Effect"),
      | Self::Read(upstream) => f.debug_tuple("Read").field(&upstream.id()).finish(),
    }
  }
}
