//! Flat-map composition settings.

use alloc::boxed::Box;
use core::num::NonZeroUsize;

use super::{ChannelProgram, ChildDecision, DynValue, UpstreamPullRequest, UpstreamPullStrategy};


/// Callbacks shared by every state of one composition.
pub(crate) struct ConcatCallbacks {
  pub(crate) child:             Box<dyn FnMut(DynValue) -> ChannelProgram + Send>,
  pub(crate) combine_children:  Box<dyn FnMut(DynValue, DynValue) -> DynValue + Send>,
  pub(crate) combine_with_done: Box<dyn FnMut(DynValue, DynValue) -> DynValue + Send>,
  pub(crate) on_pull:           Box<dyn FnMut(UpstreamPullRequest) -> UpstreamPullStrategy + Send>,
  pub(crate) on_emit:           Box<dyn FnMut(&DynValue) -> ChildDecision + Send>,
  pub(crate) max_active:        NonZeroUsize,
}

/// Describes a `ConcatAll` composition: an upstream program and the child program run for
/// each of its outputs.
///
/// The defaults give strictly sequential concatenation: one child at a time, the latest
/// child result kept, and the upstream's final value as the composition's result.
pub struct ConcatAllSpec {
  upstream:  ChannelProgram,
  callbacks: ConcatCallbacks,
}

impl ConcatAllSpec {
  /// Creates a sequential composition running `child` for each output of `upstream`.
  #[must_use]
  pub fn new<F>(upstream: ChannelProgram, child: F) -> Self
  where
    F: FnMut(DynValue) -> ChannelProgram + Send + 'static, {
    Self {
      upstream,
      callbacks: ConcatCallbacks {
        child:             Box::new(child),
        combine_children:  Box::new(|_, latest| latest),
        combine_with_done: Box::new(|_, done| done),
        on_pull:           Box::new(|_| UpstreamPullStrategy::PullAfterNext(None)),
        on_emit:           Box::new(|_| ChildDecision::Continue),
        max_active:        NonZeroUsize::MIN,
      },
    }
  }

  /// Sets how two child results are combined. The accumulated result comes first.
  #[must_use]
  pub fn with_combine_children<F>(mut self, f: F) -> Self
  where
    F: FnMut(DynValue, DynValue) -> DynValue + Send + 'static, {
    self.callbacks.combine_children = Box::new(f);
    self
  }

  /// Sets how the accumulated child result is combined with the upstream's final value.
  #[must_use]
  pub fn with_combine_with_done<F>(mut self, f: F) -> Self
  where
    F: FnMut(DynValue, DynValue) -> DynValue + Send + 'static, {
    self.callbacks.combine_with_done = Box::new(f);
    self
  }

  /// Sets the pull strategy consulted on every upstream pull.
  #[must_use]
  pub fn with_pull_strategy<F>(mut self, f: F) -> Self
  where
    F: FnMut(UpstreamPullRequest) -> UpstreamPullStrategy + Send + 'static, {
    self.callbacks.on_pull = Box::new(f);
    self
  }

  /// Sets the decision applied to every child output.
  #[must_use]
  pub fn with_child_decision<F>(mut self, f: F) -> Self
  where
    F: FnMut(&DynValue) -> ChildDecision + Send + 'static, {
    self.callbacks.on_emit = Box::new(f);
    self
  }

  /// Sets how many children may be alive at once.
  #[must_use]
  pub const fn with_max_active(mut self, max_active: NonZeroUsize) -> Self {
    self.callbacks.max_active = max_active;
    self
  }

  /// Returns how many children may be alive at once.
  #[must_use]
  pub const fn max_active(&self) -> NonZeroUsize {
    self.callbacks.max_active
  }

  pub(crate) fn into_parts(self) -> (ChannelProgram, ConcatCallbacks) {
    (self.upstream, self.callbacks)
  }
}

impl core::fmt::Debug for ConcatAllSpec {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ConcatAllSpec")
      .field("upstream", &self.upstream)
      .field("max_active", &self.callbacks.max_active)
      .finish_non_exhaustive()
  }
}
