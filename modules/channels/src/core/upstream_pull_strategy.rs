use super::DynValue;

/// Decides when the composition pulls its upstream again while children are active.
#[derive(Debug)]
pub enum UpstreamPullStrategy {
  /// Pull the upstream again as soon as the current child yields or finishes.
  PullAfterNext(Option<DynValue>),
  /// Pull the upstream again only after every queued child had a turn.
  PullAfterAllEnqueued(Option<DynValue>),
}

impl UpstreamPullStrategy {
  pub(crate) fn into_parts(self) -> (Option<DynValue>, bool) {
    match self {
      | Self::PullAfterNext(separator) => (separator, true),
      | Self::PullAfterAllEnqueued(separator) => (separator, false),
    }
  }
}
