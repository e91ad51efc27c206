use super::{ChannelExit, DynValue};

/// Result of reading one step from an upstream executor.
#[derive(Debug)]
pub enum UpstreamSignal {
  /// The upstream produced an output value.
  Emit(DynValue),
  /// The upstream finished with the given outcome.
  Done(ChannelExit),
}
