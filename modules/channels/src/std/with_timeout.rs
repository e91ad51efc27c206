use alloc::boxed::Box;
use core::time::Duration;

use crate::core::{Cause, ChannelEffect, Defect};


/// Fails `effect` with [`Defect::Timeout`] when it does not finish within `duration`.
#[must_use]
pub fn with_timeout(effect: ChannelEffect, duration: Duration) -> ChannelEffect {
  ChannelEffect::from_fn(move |environment| {
    Box::pin(async move {
      match tokio::time::timeout(duration, effect.run(environment)).await {
        | Ok(exit) => exit,
        | Err(_) => Err(Cause::die(Defect::Timeout)),
      }
    })
  })
}

/// Runs `fallback` instead when `effect` does not finish within `duration`.
///
/// Only a timeout switches to the fallback; other failures of `effect` are kept.
#[must_use]
pub fn timeout_or_else(effect: ChannelEffect, duration: Duration, fallback: ChannelEffect) -> ChannelEffect {
  ChannelEffect::from_fn(move |environment| {
    Box::pin(async move {
      match with_timeout(effect, duration).run(environment.clone()).await {
        | Err(cause) if cause.is_timeout() => fallback.run(environment).await,
        | exit => exit,
      }
    })
  })
}
