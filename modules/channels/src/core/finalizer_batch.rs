use alloc::{boxed::Box, collections::VecDeque, vec::Vec};

use super::{ArcShared, Cause, ChannelEffect, SpinSyncMutex, unit};

#[cfg(test)]
mod tests;

/// Cleanup effects popped from a continuation stack and run as one unit.
///
/// The queue is shared between the effect handed to the driver and the executor that
/// produced it. If the driver abandons the effect halfway, `close` drains whatever is
/// left, so every effect in the batch runs exactly once.
#[derive(Clone)]
pub(crate) struct FinalizerBatch {
  pending: ArcShared<SpinSyncMutex<VecDeque<ChannelEffect>>>,
}

impl FinalizerBatch {
  pub(crate) fn new(effects: Vec<ChannelEffect>) -> Self {
    Self { pending: ArcShared::new(SpinSyncMutex::new(effects.into_iter().collect())) }
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.pending.lock().is_empty()
  }

  /// Appends `effects` behind the ones still waiting to run.
  pub(crate) fn extend(&self, effects: Vec<ChannelEffect>) {
    self.pending.lock().extend(effects);
  }

  /// Runs the remaining effects in order. Failures are combined in parallel and never stop
  /// the effects behind them.
  pub(crate) fn into_effect(self) -> ChannelEffect {
    ChannelEffect::from_fn(move |environment| {
      Box::pin(async move {
        let mut cause = Cause::Empty;
        loop {
          let next = self.pending.lock().pop_front();
          let Some(effect) = next else {
            break;
          };
          if let Err(failure) = effect.run(environment.clone()).await {
            cause = cause.both(failure);
          }
        }
        if cause.is_empty() { Ok(unit()) } else { Err(cause) }
      })
    })
  }
}
