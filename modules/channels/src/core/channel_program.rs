//! Channel program AST.

use alloc::{boxed::Box, vec, vec::Vec};
use core::any::{Any, type_name};

use super::{
  AsyncInputQueue, Cause, ChannelEffect, ChannelExit, ConcatAllSpec, Defect, DynValue, Environment, InputElement,
  downcast_value, unit,
};

#[cfg(test)]
mod tests;

/// Continuation applied to a successful value.
pub type SuccessContinuation = Box<dyn FnOnce(DynValue) -> ChannelProgram + Send>;

/// Continuation applied to a failure cause.
pub type FailureContinuation = Box<dyn FnOnce(Cause) -> ChannelProgram + Send>;

/// Cleanup attached to a program, run exactly once with the program's outcome.
pub type FinalizerFn = Box<dyn FnOnce(&ChannelExit) -> ChannelEffect + Send>;

/// Builds the release for an acquired resource.
pub type ReleaseFactory = Box<dyn FnOnce(&DynValue) -> FinalizerFn + Send>;

/// Lazily built program.
pub type ProgramThunk = Box<dyn FnOnce() -> ChannelProgram + Send>;

/// Immutable description of one unit of channel work.
///
/// Programs only describe work. [`ChannelExecutor`](super::ChannelExecutor) interprets them
/// one step at a time.
pub enum ChannelProgram {
  /// Reads one value from the upstream.
  Read {
    /// Runs with the next upstream output.
    on_input:   SuccessContinuation,
    /// Runs when the upstream fails.
    on_failure: FailureContinuation,
    /// Runs with the upstream's final value.
    on_done:    SuccessContinuation,
  },
  /// Emits one output, then continues with `next`.
  Emit {
    /// Output value.
    value: DynValue,
    /// Continuation program.
    next:  Box<ChannelProgram>,
  },
  /// Fails with a lazily computed cause.
  Fail(Box<dyn FnOnce() -> Cause + Send>),
  /// Fails with the given cause.
  FailCause(Cause),
  /// Succeeds with a lazily computed value.
  Succeed(Box<dyn FnOnce() -> DynValue + Send>),
  /// Succeeds with the given value.
  SucceedNow(DynValue),
  /// Runs a background effect and settles with its outcome.
  FromEffect(ChannelEffect),
  /// Runs `inner`, then continues with the branch matching its outcome.
  Fold {
    /// Wrapped program.
    inner:      Box<ChannelProgram>,
    /// Branch taken on success.
    on_success: SuccessContinuation,
    /// Branch taken on failure.
    on_failure: FailureContinuation,
  },
  /// Runs `inner` and then `finalizer`, whatever the outcome.
  Ensuring {
    /// Wrapped program.
    inner:     Box<ChannelProgram>,
    /// Cleanup run with the outcome of `inner`.
    finalizer: FinalizerFn,
  },
  /// Acquires a resource, emits it and releases it when the enclosing program exits.
  BracketOut {
    /// Acquisition effect.
    acquire: ChannelEffect,
    /// Builds the release for the acquired value.
    release: ReleaseFactory,
  },
  /// Feeds the outputs of `left` into the reads of `right`.
  PipeTo {
    /// Producing program.
    left:  Box<ChannelProgram>,
    /// Consuming program.
    right: Box<ChannelProgram>,
  },
  /// Runs `inner` with a substituted environment.
  Provide {
    /// Environment seen by `inner`.
    environment: Environment,
    /// Wrapped program.
    inner:       Box<ChannelProgram>,
  },
  /// Runs a child program for each upstream output.
  ConcatAll(Box<ConcatAllSpec>),
  /// Drains the upstream into `input` on a background task while `inner` runs.
  Bridge {
    /// Queue receiving the upstream's outputs.
    input: AsyncInputQueue,
    /// Program consuming the queue.
    inner: Box<ChannelProgram>,
  },
  /// Builds the program when it is reached.
  Suspend(ProgramThunk),
}

impl ChannelProgram {
  /// Emits `value` and succeeds with unit.
  #[must_use]
  pub fn emit<T>(value: T) -> Self
  where
    T: Any + Send, {
    let value: DynValue = Box::new(value);
    Self::emit_dyn(value)
  }

  /// Emits an erased value and succeeds with unit.
  #[must_use]
  pub fn emit_dyn(value: DynValue) -> Self {
    Self::emit_then(value, Self::unit())
  }

  /// Emits an erased value and continues with `next`.
  #[must_use]
  pub fn emit_then(value: DynValue, next: ChannelProgram) -> Self {
    Self::Emit { value, next: Box::new(next) }
  }

  /// Emits every value in order and succeeds with unit.
  #[must_use]
  pub fn write_all<T>(values: Vec<T>) -> Self
  where
    T: Any + Send, {
    Self::write_iter(values.into_iter())
  }

  /// Emits one value per step, so at most one element is ever held as a program.
  fn write_iter<T>(mut values: vec::IntoIter<T>) -> Self
  where
    T: Any + Send, {
    Self::suspend(move || match values.next() {
      | Some(value) => {
        let value: DynValue = Box::new(value);
        Self::emit_then(value, Self::write_iter(values))
      },
      | None => Self::unit(),
    })
  }

  /// Succeeds with `value`.
  #[must_use]
  pub fn succeed<T>(value: T) -> Self
  where
    T: Any + Send, {
    let value: DynValue = Box::new(value);
    Self::SucceedNow(value)
  }

  /// Succeeds with an erased value.
  #[must_use]
  pub const fn succeed_now(value: DynValue) -> Self {
    Self::SucceedNow(value)
  }

  /// Succeeds with the value returned by `f` when the program is reached.
  #[must_use]
  pub fn succeed_with<T, F>(f: F) -> Self
  where
    T: Any + Send,
    F: FnOnce() -> T + Send + 'static, {
    Self::Succeed(Box::new(move || {
      let value: DynValue = Box::new(f());
      value
    }))
  }

  /// Succeeds with unit.
  #[must_use]
  pub fn unit() -> Self {
    Self::SucceedNow(unit())
  }

  /// Fails with a typed error.
  #[must_use]
  pub fn fail<E>(error: E) -> Self
  where
    E: Any + Send + Sync, {
    Self::FailCause(Cause::fail(error))
  }

  /// Fails with `cause`.
  #[must_use]
  pub const fn fail_cause(cause: Cause) -> Self {
    Self::FailCause(cause)
  }

  /// Fails with the cause returned by `f` when the program is reached.
  #[must_use]
  pub fn fail_with<F>(f: F) -> Self
  where
    F: FnOnce() -> Cause + Send + 'static, {
    Self::Fail(Box::new(f))
  }

  /// Settles with an existing outcome.
  #[must_use]
  pub fn from_exit(exit: ChannelExit) -> Self {
    match exit {
      | Ok(value) => Self::SucceedNow(value),
      | Err(cause) => Self::FailCause(cause),
    }
  }

  /// Runs `effect` and settles with its outcome.
  #[must_use]
  pub const fn from_effect(effect: ChannelEffect) -> Self {
    Self::FromEffect(effect)
  }

  /// Reads one upstream value.
  #[must_use]
  pub fn read<I, F, D>(on_input: I, on_failure: F, on_done: D) -> Self
  where
    I: FnOnce(DynValue) -> ChannelProgram + Send + 'static,
    F: FnOnce(Cause) -> ChannelProgram + Send + 'static,
    D: FnOnce(DynValue) -> ChannelProgram + Send + 'static, {
    Self::Read { on_input: Box::new(on_input), on_failure: Box::new(on_failure), on_done: Box::new(on_done) }
  }

  /// Reads one upstream value, propagating upstream failure and completion.
  #[must_use]
  pub fn read_with<I>(on_input: I) -> Self
  where
    I: FnOnce(DynValue) -> ChannelProgram + Send + 'static, {
    Self::read(on_input, Self::FailCause, Self::SucceedNow)
  }

  /// Re-emits every upstream output and finishes with the upstream's final value.
  #[must_use]
  pub fn identity() -> Self {
    Self::read_with(|value| Self::emit_then(value, Self::identity()))
  }

  /// Builds the program when it is reached.
  #[must_use]
  pub fn suspend<F>(f: F) -> Self
  where
    F: FnOnce() -> ChannelProgram + Send + 'static, {
    Self::Suspend(Box::new(f))
  }

  /// Acquires a resource, emits it and releases it when the enclosing program exits.
  ///
  /// `release` receives a clone of the acquired value together with the outcome of the
  /// enclosing program.
  #[must_use]
  pub fn bracket_out<T, R>(acquire: ChannelEffect, release: R) -> Self
  where
    T: Any + Clone + Send,
    R: FnOnce(T, &ChannelExit) -> ChannelEffect + Send + 'static, {
    let release: ReleaseFactory = Box::new(move |resource: &DynValue| {
      let resource = resource.downcast_ref::<T>().cloned();
      let finalizer: FinalizerFn = Box::new(move |exit: &ChannelExit| match resource {
        | Some(resource) => release(resource, exit),
        | None => ChannelEffect::fail_cause(Cause::die(Defect::TypeMismatch { expected: type_name::<T>() })),
      });
      finalizer
    });
    Self::BracketOut { acquire, release }
  }

  /// Drains the current upstream into `input` on a background task while `inner` runs.
  #[must_use]
  pub fn bridge(input: AsyncInputQueue, inner: ChannelProgram) -> Self {
    Self::Bridge { input, inner: Box::new(inner) }
  }

  /// Emits every element offered to `input` and finishes with its final value.
  #[must_use]
  pub fn from_input(input: AsyncInputQueue) -> Self {
    let queue = input.clone();
    let take = ChannelEffect::from_future(async move {
      let element: DynValue = Box::new(queue.take().await);
      Ok(element)
    });
    Self::from_effect(take).and_then(move |element| match downcast_value::<InputElement>(element) {
      | Ok(InputElement::Element(value)) => Self::emit_then(value, Self::from_input(input)),
      | Ok(InputElement::Done(value)) => Self::SucceedNow(value),
      | Ok(InputElement::Failed(cause)) | Err(cause) => Self::FailCause(cause),
    })
  }

  /// Continues with the branch matching this program's outcome.
  #[must_use]
  pub fn fold<S, F>(self, on_success: S, on_failure: F) -> Self
  where
    S: FnOnce(DynValue) -> ChannelProgram + Send + 'static,
    F: FnOnce(Cause) -> ChannelProgram + Send + 'static, {
    Self::Fold { inner: Box::new(self), on_success: Box::new(on_success), on_failure: Box::new(on_failure) }
  }

  /// Continues with `next` after a success.
  #[must_use]
  pub fn and_then<S>(self, next: S) -> Self
  where
    S: FnOnce(DynValue) -> ChannelProgram + Send + 'static, {
    self.fold(next, Self::FailCause)
  }

  /// Recovers from a failure with `handler`.
  #[must_use]
  pub fn catch_all<F>(self, handler: F) -> Self
  where
    F: FnOnce(Cause) -> ChannelProgram + Send + 'static, {
    self.fold(Self::SucceedNow, handler)
  }

  /// Maps the final value.
  #[must_use]
  pub fn map<F>(self, f: F) -> Self
  where
    F: FnOnce(DynValue) -> DynValue + Send + 'static, {
    self.and_then(move |value| Self::SucceedNow(f(value)))
  }

  /// Runs `finalizer` with this program's outcome once it exits.
  #[must_use]
  pub fn ensuring<F>(self, finalizer: F) -> Self
  where
    F: FnOnce(&ChannelExit) -> ChannelEffect + Send + 'static, {
    Self::Ensuring { inner: Box::new(self), finalizer: Box::new(finalizer) }
  }

  /// Feeds this program's outputs into the reads of `right`.
  #[must_use]
  pub fn pipe_to(self, right: ChannelProgram) -> Self {
    Self::PipeTo { left: Box::new(self), right: Box::new(right) }
  }

  /// Runs this program with `environment`.
  #[must_use]
  pub fn provide(self, environment: Environment) -> Self {
    Self::Provide { environment, inner: Box::new(self) }
  }

  /// Runs the child built by `f` for each output of this program, one child at a time.
  #[must_use]
  pub fn concat_map<F>(self, f: F) -> Self
  where
    F: FnMut(DynValue) -> ChannelProgram + Send + 'static, {
    Self::concat_all(ConcatAllSpec::new(self, f))
  }

  /// Runs the composition described by `spec`.
  #[must_use]
  pub fn concat_all(spec: ConcatAllSpec) -> Self {
    Self::ConcatAll(Box::new(spec))
  }
}

impl core::fmt::Debug for ChannelProgram {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let name = match self {
      | Self::Read { .. } => "Read",
      | Self::Emit { .. } => "Emit",
      | Self::Fail(_) => "Fail",
      | Self::FailCause(_) => "FailCause",
      | Self::Succeed(_) => "Succeed",
      | Self::SucceedNow(_) => "SucceedNow",
      | Self::FromEffect(_) => "FromEffect",
      | Self::Fold { .. } => "Fold",
      | Self::Ensuring { .. } => "Ensuring",
      | Self::BracketOut { .. } => "BracketOut",
      | Self::PipeTo { .. } => "PipeTo",
      | Self::Provide { .. } => "Provide",
      | Self::ConcatAll(_) => "ConcatAll",
      | Self::Bridge { .. } => "Bridge",
      | Self::Suspend(_) => "Suspend",
    };
    f.debug_tuple("ChannelProgram").field(&name).finish()
  }
}
