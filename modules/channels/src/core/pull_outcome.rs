use super::{ChannelExit, DynValue};

/// Result of [`ChannelPuller::pull`](super::ChannelPuller::pull).
#[derive(Debug)]
pub enum PullOutcome {
  /// The program produced an output.
  Element(DynValue),
  /// The program finished. Pulling again repeats the final outcome.
  Done(ChannelExit),
}
