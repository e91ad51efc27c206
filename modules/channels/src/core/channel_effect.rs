//! Lazily-run effects.

use alloc::boxed::Box;
use core::{any::Any, future::Future};

use super::{BoxFuture, Cause, ChannelExit, Defect, DynValue, Environment, unit};

#[cfg(test)]
mod tests;

/// A background computation the executor hands to its driver.
///
/// Nothing runs until [`ChannelEffect::run`] is called and the returned future is polled.
/// The environment passed to `run` is the one active in the executor when the effect was
/// reached, unless the effect was bound earlier with [`ChannelEffect::provide`].
pub struct ChannelEffect {
  run: Box<dyn FnOnce(Environment) -> BoxFuture<ChannelExit> + Send>,
}

impl ChannelEffect {
  /// Creates an effect from a function producing a future.
  #[must_use]
  pub fn from_fn<F>(f: F) -> Self
  where
    F: FnOnce(Environment) -> BoxFuture<ChannelExit> + Send + 'static, {
    Self { run: Box::new(f) }
  }

  /// Creates an effect from a future that ignores the environment.
  #[must_use]
  pub fn from_future<Fut>(future: Fut) -> Self
  where
    Fut: Future<Output = ChannelExit> + Send + 'static, {
    Self::from_fn(move |_| Box::pin(future))
  }

  /// Creates an effect that runs a synchronous function when the effect runs.
  ///
  /// A panic inside `f` becomes a [`Defect::Panic`] failure.
  #[must_use]
  pub fn sync<F>(f: F) -> Self
  where
    F: FnOnce(&Environment) -> ChannelExit + Send + 'static, {
    Self::from_fn(move |environment| {
      let exit = match Defect::capture(|| f(&environment)) {
        | Ok(exit) => exit,
        | Err(defect) => Err(Cause::die(defect)),
      };
      Box::pin(core::future::ready(exit))
    })
  }

  /// Creates an effect that succeeds with `value`.
  #[must_use]
  pub fn succeed<T>(value: T) -> Self
  where
    T: Any + Send, {
    let value: DynValue = Box::new(value);
    Self::from_future(core::future::ready(Ok(value)))
  }

  /// Creates an effect that succeeds with unit.
  #[must_use]
  pub fn unit() -> Self {
    Self::from_future(core::future::ready(Ok(unit())))
  }

  /// Creates an effect that fails with a typed error.
  #[must_use]
  pub fn fail<E>(error: E) -> Self
  where
    E: Any + Send + Sync, {
    Self::fail_cause(Cause::fail(error))
  }

  /// Creates an effect that fails with `cause`.
  #[must_use]
  pub fn fail_cause(cause: Cause) -> Self {
    Self::from_future(core::future::ready(Err(cause)))
  }

  /// Runs `next` with the value of this effect when it succeeds.
  #[must_use]
  pub fn and_then<F>(self, next: F) -> Self
  where
    F: FnOnce(DynValue) -> ChannelEffect + Send + 'static, {
    Self::from_fn(move |environment| {
      Box::pin(async move {
        let value = self.run(environment.clone()).await?;
        match Defect::capture(|| next(value)) {
          | Ok(effect) => effect.run(environment).await,
          | Err(defect) => Err(Cause::die(defect)),
        }
      })
    })
  }

  /// Binds the effect to `environment`, ignoring whatever environment it is run with.
  #[must_use]
  pub fn provide(self, environment: Environment) -> Self {
    Self::from_fn(move |_| self.run(environment))
  }

  /// Starts the effect with the given environment.
  #[must_use]
  pub fn run(self, environment: Environment) -> BoxFuture<ChannelExit> {
    (self.run)(environment)
  }
}

impl core::fmt::Debug for ChannelEffect {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChannelEffect").finish_non_exhaustive()
  }
}
