use alloc::boxed::Box;

use super::{ChannelEffect, ChannelExit};


/// Decision taken by the first side of a merge to finish.
pub enum MergeDecision {
  /// Stop the other side immediately and finish with the given effect.
  Done(ChannelEffect),
  /// Wait for the other side and compute the final effect from its outcome.
  Await(Box<dyn FnOnce(ChannelExit) -> ChannelEffect + Send>),
}

impl MergeDecision {
  /// Creates a decision that terminates the merge with `effect`.
  #[must_use]
  pub const fn done(effect: ChannelEffect) -> Self {
    Self::Done(effect)
  }

  /// Creates a decision that awaits the other side.
  #[must_use]
  pub fn await_with<F>(f: F) -> Self
  where
    F: FnOnce(ChannelExit) -> ChannelEffect + Send + 'static, {
    Self::Await(Box::new(f))
  }

  /// Creates a decision that awaits the other side and adopts its outcome.
  #[must_use]
  pub fn await_other() -> Self {
    Self::await_with(|exit| match exit {
      | Ok(value) => ChannelEffect::from_future(core::future::ready(Ok(value))),
      | Err(cause) => ChannelEffect::fail_cause(cause),
    })
  }

  /// Returns true when the decision terminates the merge.
  #[must_use]
  pub const fn is_done(&self) -> bool {
    matches!(self, Self::Done(_))
  }
}

impl core::fmt::Debug for MergeDecision {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::Done(_) => f.write_str("MergeDecision::Done"),
      | Self::Await(_) => f.write_str("MergeDecision::Await"),
    }
  }
}
