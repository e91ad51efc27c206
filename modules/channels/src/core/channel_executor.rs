//! Interpreter for channel programs.

use alloc::{boxed::Box, vec, vec::Vec};
use core::mem;

use super::{
  ArcShared, AsyncInputQueue, Cause, ChannelEffect, ChannelExit, ChannelProgram, ChannelRuntimeConfig, ChannelState,
  Defect, DynValue, Environment, ExecutorHandle, ExecutorId, LOG_TARGET, TaskSpawner, UpstreamSignal, combine_exits,
  continuation::{Continuation, Finalizer},
  effect_continuation::EffectContinuation,
  finalizer_batch::FinalizerBatch,
  pending_read::PendingRead,
  subexecutor_state::{ChildPool, PullFromUpstream, SubexecutorState},
  trampoline::forward_to_input,
  unit,
};

mod subexecutor;

/// Stateful interpreter driving one [`ChannelProgram`].
///
/// The executor never recurses into nested programs and never awaits. Every call to
/// [`ChannelExecutor::step`] runs until the program emits, finishes, or needs its driver to
/// run an effect or read an upstream. Nested programs push entries on an explicit
/// continuation stack; `ConcatAll` installs a sub-executor that owns the upstream and child
/// executors of the composition.
///
/// Each step checks, in order: a pending cancellation, a resumed read or effect, the active
/// sub-executor, and finally the current program.
pub struct ChannelExecutor {
  id:               ExecutorId,
  current:          Option<ChannelProgram>,
  stack:            Vec<Continuation>,
  sub_executor:     Option<SubexecutorState>,
  input:            Option<ExecutorHandle>,
  environment:      Environment,
  spawner:          Option<ArcShared<dyn TaskSpawner>>,
  in_progress:      Option<FinalizerBatch>,
  closing:          Vec<ExecutorHandle>,
  cancel_requested: bool,
  cancelled:        Option<ChannelExit>,
  done:             Option<ChannelExit>,
  emitted:          Option<DynValue>,
  pending_read:     Option<PendingRead>,
  read_result:      Option<UpstreamSignal>,
  pending_effect:   Option<EffectContinuation>,
  effect_result:    Option<ChannelExit>,
}

impl ChannelExecutor {
  /// Creates an executor for `program` without an upstream.
  #[must_use]
  pub fn new(program: ChannelProgram, config: &ChannelRuntimeConfig) -> Self {
    Self::with_parts(program, None, config.environment().clone(), config.spawner().cloned())
  }

  /// Creates an executor for `program` whose reads are served by `upstream`.
  #[must_use]
  pub fn with_upstream(program: ChannelProgram, upstream: ExecutorHandle, config: &ChannelRuntimeConfig) -> Self {
    Self::with_parts(program, Some(upstream), config.environment().clone(), config.spawner().cloned())
  }

  pub(crate) fn with_parts(
    program: ChannelProgram,
    input: Option<ExecutorHandle>,
    environment: Environment,
    spawner: Option<ArcShared<dyn TaskSpawner>>,
  ) -> Self {
    let id = ExecutorId::next();
    tracing::debug!(
      target: LOG_TARGET,
      executor = id.value(),
      upstream = input.as_ref().map(|handle| handle.id().value()),
      "channel executor created"
    );
    Self {
      id,
      current: Some(program),
      stack: Vec::new(),
      sub_executor: None,
      input,
      environment,
      spawner,
      in_progress: None,
      closing: Vec::new(),
      cancel_requested: false,
      cancelled: None,
      done: None,
      emitted: None,
      pending_read: None,
      read_result: None,
      pending_effect: None,
      effect_result: None,
    }
  }

  /// Returns the executor id.
  #[must_use]
  pub const fn id(&self) -> ExecutorId {
    self.id
  }

  /// Returns the environment currently in effect.
  #[must_use]
  pub const fn environment(&self) -> &Environment {
    &self.environment
  }

  /// Returns the executor serving reads, if any.
  #[must_use]
  pub const fn upstream(&self) -> Option<&ExecutorHandle> {
    self.input.as_ref()
  }

  /// Returns true once the executor has finished.
  #[must_use]
  pub const fn is_done(&self) -> bool {
    self.done.is_some()
  }

  /// Runs the program until it emits, finishes, or needs an effect or a read.
  pub fn step(&mut self) -> ChannelState {
    loop {
      if let Some(exit) = self.cancelled.take() {
        return self.process_cancellation(exit);
      }
      let outcome = if let Some(signal) = self.read_result.take() {
        self.process_read_result(signal)
      } else if let Some(exit) = self.effect_result.take() {
        self.process_effect_result(exit)
      } else if self.done.is_some() {
        Some(ChannelState::Done)
      } else if self.pending_read.is_some() || self.pending_effect.is_some() {
        self.pending_read = None;
        let cause = Cause::die(Defect::message("executor stepped before its pending step was resumed"));
        let handles = self.reclaim_pending_executors();
        if handles.is_empty() { self.settle(Err(cause)) } else { self.finish_subexecutor(Err(cause), handles) }
      } else if let Some(state) = self.sub_executor.take() {
        self.drive_subexecutor(state)
      } else if let Some(program) = self.current.take() {
        self.interpret(program)
      } else {
        self.settle(Ok(unit()))
      };
      if let Some(state) = outcome {
        return state;
      }
    }
  }

  /// Takes the value produced by the last [`ChannelState::Emit`].
  pub fn take_emitted(&mut self) -> Option<DynValue> {
    self.emitted.take()
  }

  /// Takes the outcome of a finished executor.
  ///
  /// Later calls observe unit after a success, or the same cause after a failure.
  pub fn take_done(&mut self) -> Option<ChannelExit> {
    let exit = self.done.take()?;
    self.done = Some(match &exit {
      | Ok(_) => Ok(unit()),
      | Err(cause) => Err(cause.clone()),
    });
    Some(exit)
  }

  /// Hands back the signal requested by the last [`ChannelState::Read`].
  pub fn resume_read(&mut self, signal: UpstreamSignal) {
    self.read_result = Some(signal);
  }

  /// Hands back the outcome of the effect returned by the last [`ChannelState::Effect`].
  pub fn resume_effect(&mut self, exit: ChannelExit) {
    self.effect_result = Some(exit);
  }

  /// Requests cancellation. The next step settles with `exit`. Only the first request counts.
  pub fn cancel_with(&mut self, exit: ChannelExit) {
    if self.cancel_requested || self.done.is_some() {
      return;
    }
    tracing::debug!(target: LOG_TARGET, executor = self.id.value(), "cancellation requested");
    self.cancel_requested = true;
    self.cancelled = Some(exit);
  }

  /// Collects every pending cleanup into one effect: what is left of an interrupted
  /// finalizer batch, the executors a composition was closing or still owns, then the
  /// finalizers left on the stack (LIFO).
  ///
  /// The cleanup stays tracked until it has run, so closing again only returns what an
  /// abandoned run left behind. Returns `None` when nothing is pending.
  pub fn close(&mut self, exit: &ChannelExit) -> Option<ChannelEffect> {
    let mut effects = Vec::new();
    for handle in self.reclaim_pending_executors() {
      effects.extend(handle.close(exit));
    }
    if let Some(state) = self.sub_executor.take() {
      effects.extend(state.into_handles().iter().filter_map(|handle| handle.close(exit)));
    }
    while let Some(entry) = self.stack.pop() {
      if let Continuation::Finalizer(finalizer) = entry {
        if let Some(effect) = self.resolve_finalizer(finalizer, exit) {
          effects.push(effect);
        }
      }
    }
    self.current = None;
    self.pending_read = None;
    if effects.is_empty() && self.in_progress.as_ref().is_none_or(FinalizerBatch::is_empty) {
      self.in_progress = None;
      return None;
    }
    tracing::debug!(
      target: LOG_TARGET,
      executor = self.id.value(),
      cleanups = effects.len(),
      "closing channel executor"
    );
    Some(self.track_batch(effects))
  }

  fn derive(&self, program: ChannelProgram) -> Self {
    Self::with_parts(program, self.input.clone(), self.environment.clone(), self.spawner.clone())
  }

  fn interpret(&mut self, program: ChannelProgram) -> Option<ChannelState> {
    tracing::trace!(target: LOG_TARGET, executor = self.id.value(), program = ?program, "interpreting step");
    match program {
      | ChannelProgram::Read { on_input, on_failure, on_done } => match &self.input {
        | Some(input) => {
          let input = input.clone();
          self.pending_read = Some(PendingRead::Program { on_input, on_failure, on_done });
          Some(ChannelState::Read(input))
        },
        | None => {
          self.current = Some(guarded(|| on_done(unit())));
          None
        },
      },
      | ChannelProgram::Emit { value, next } => {
        self.current = Some(*next);
        self.emit_value(value)
      },
      | ChannelProgram::Fail(thunk) => {
        let cause = Defect::capture(thunk).unwrap_or_else(Cause::die);
        self.settle(Err(cause))
      },
      | ChannelProgram::FailCause(cause) => self.settle(Err(cause)),
      | ChannelProgram::Succeed(thunk) => {
        let exit = Defect::capture(thunk).map_err(Cause::die);
        self.settle(exit)
      },
      | ChannelProgram::SucceedNow(value) => self.settle(Ok(value)),
      | ChannelProgram::FromEffect(effect) => self.await_effect(effect, EffectContinuation::Settle),
      | ChannelProgram::Fold { inner, on_success, on_failure } => {
        self.stack.push(Continuation::Fold { on_success, on_failure });
        self.current = Some(*inner);
        None
      },
      | ChannelProgram::Ensuring { inner, finalizer } => {
        self.stack.push(Continuation::Finalizer(Finalizer::Release(finalizer)));
        self.current = Some(*inner);
        None
      },
      | ChannelProgram::BracketOut { acquire, release } => {
        self.await_effect(acquire, EffectContinuation::BracketAcquired(release))
      },
      | ChannelProgram::PipeTo { left, right } => {
        let previous = self.input.take();
        let left = ExecutorHandle::new(Self::with_parts(
          *left,
          previous.clone(),
          self.environment.clone(),
          self.spawner.clone(),
        ));
        tracing::debug!(target: LOG_TARGET, executor = self.id.value(), left = left.id().value(), "piping");
        self.input = Some(left);
        self.stack.push(Continuation::Finalizer(Finalizer::RestoreInput { previous }));
        self.current = Some(*right);
        None
      },
      | ChannelProgram::Provide { environment, inner } => {
        let previous = mem::replace(&mut self.environment, environment);
        self.stack.push(Continuation::Finalizer(Finalizer::RestoreEnvironment { previous }));
        self.current = Some(*inner);
        None
      },
      | ChannelProgram::ConcatAll(spec) => {
        let (upstream, callbacks) = spec.into_parts();
        let upstream = ExecutorHandle::new(self.derive(upstream));
        tracing::debug!(
          target: LOG_TARGET,
          executor = self.id.value(),
          upstream = upstream.id().value(),
          max_active = callbacks.max_active.get(),
          "sub-executor installed"
        );
        self.sub_executor =
          Some(SubexecutorState::PullFromUpstream(PullFromUpstream { upstream, pool: ChildPool::new(callbacks) }));
        None
      },
      | ChannelProgram::Bridge { input, inner } => self.start_bridge(input, *inner),
      | ChannelProgram::Suspend(thunk) => {
        self.current = Some(guarded(thunk));
        None
      },
    }
  }

  fn start_bridge(&mut self, queue: AsyncInputQueue, inner: ChannelProgram) -> Option<ChannelState> {
    let Some(upstream) = self.input.take() else {
      queue.done(unit());
      self.current = Some(inner);
      return None;
    };
    let Some(spawner) = self.spawner.clone() else {
      self.input = Some(upstream);
      return self.settle(Err(Cause::die(Defect::SpawnerUnavailable)));
    };
    let task = spawner.spawn(Box::pin(forward_to_input(upstream.clone(), queue)));
    tracing::debug!(target: LOG_TARGET, executor = self.id.value(), upstream = upstream.id().value(), "bridge started");
    self.stack.push(Continuation::Finalizer(Finalizer::CancelBridge { task, previous: Some(upstream) }));
    self.current = Some(inner);
    None
  }

  fn emit_value(&mut self, value: DynValue) -> Option<ChannelState> {
    self.emitted = Some(value);
    Some(ChannelState::Emit)
  }

  /// Queues `effects` behind any finalizers still pending and returns the effect running them.
  fn track_batch(&mut self, effects: Vec<ChannelEffect>) -> ChannelEffect {
    let batch = match self.in_progress.take() {
      | Some(batch) => {
        batch.extend(effects);
        batch
      },
      | None => FinalizerBatch::new(effects),
    };
    self.in_progress = Some(batch.clone());
    batch.into_effect()
  }

  /// Takes back the executors an unfinished effect was responsible for: the children being
  /// closed and, while a child close is pending, the rest of the composition.
  fn reclaim_pending_executors(&mut self) -> Vec<ExecutorHandle> {
    let mut handles = mem::take(&mut self.closing);
    if let Some(EffectContinuation::ResumeSubexecutor(state)) = self.pending_effect.take() {
      handles.extend(state.into_handles());
    }
    handles
  }

  fn await_effect(&mut self, effect: ChannelEffect, continuation: EffectContinuation) -> Option<ChannelState> {
    self.pending_effect = Some(continuation);
    Some(ChannelState::Effect(effect.run(self.environment.clone())))
  }

  fn process_read_result(&mut self, signal: UpstreamSignal) -> Option<ChannelState> {
    match self.pending_read.take() {
      | Some(PendingRead::Program { on_input, on_failure, on_done }) => {
        self.current = Some(match signal {
          | UpstreamSignal::Emit(value) => guarded(|| on_input(value)),
          | UpstreamSignal::Done(Ok(value)) => guarded(|| on_done(value)),
          | UpstreamSignal::Done(Err(cause)) => guarded(|| on_failure(cause)),
        });
        None
      },
      | Some(PendingRead::Upstream) => match self.sub_executor.take() {
        | Some(SubexecutorState::PullFromUpstream(pulling)) => self.on_upstream_signal(pulling, signal),
        | other => self.lost_subexecutor(other),
      },
      | Some(PendingRead::Child) => match self.sub_executor.take() {
        | Some(SubexecutorState::PullFromChild(running)) => self.on_child_signal(running, signal),
        | other => self.lost_subexecutor(other),
      },
      | None => None,
    }
  }

  fn process_effect_result(&mut self, exit: ChannelExit) -> Option<ChannelState> {
    match self.pending_effect.take() {
      | Some(EffectContinuation::Settle) => self.settle(exit),
      | Some(EffectContinuation::BracketAcquired(release)) => match exit {
        | Ok(resource) => match Defect::capture(|| release(&resource)) {
          | Ok(finalizer) => {
            self.stack.push(Continuation::Finalizer(Finalizer::Release(finalizer)));
            self.current = Some(ChannelProgram::emit_dyn(resource));
            None
          },
          | Err(defect) => self.settle(Err(Cause::die(defect))),
        },
        | Err(cause) => self.settle(Err(cause)),
      },
      | Some(EffectContinuation::ResettleAfterFinalizers(original)) => {
        self.in_progress = None;
        if let Err(cause) = &exit {
          tracing::warn!(target: LOG_TARGET, executor = self.id.value(), cause = ?cause, "finalizer failed");
        }
        self.settle(combine_exits(original, exit))
      },
      | Some(EffectContinuation::ResumeSubexecutor(state)) => match exit {
        | Ok(_) => {
          self.closing.clear();
          self.sub_executor = Some(state);
          None
        },
        | Err(cause) => {
          tracing::warn!(target: LOG_TARGET, executor = self.id.value(), cause = ?cause, "child close failed");
          self.closing.clear();
          self.finish_subexecutor(Err(cause), state.into_handles())
        },
      },
      | Some(EffectContinuation::FinishSubexecutor(original)) => {
        self.closing.clear();
        if let Err(cause) = &exit {
          tracing::warn!(target: LOG_TARGET, executor = self.id.value(), cause = ?cause, "sub-executor cleanup failed");
        }
        self.settle(combine_exits(original, exit))
      },
      | None => None,
    }
  }

  fn process_cancellation(&mut self, exit: ChannelExit) -> ChannelState {
    tracing::debug!(target: LOG_TARGET, executor = self.id.value(), "cancelled");
    self.current = None;
    self.emitted = None;
    self.pending_read = None;
    self.read_result = None;
    self.effect_result = None;
    self.closing = self.reclaim_pending_executors();
    self.finish(exit)
  }

  /// Settles the current program with `exit`.
  ///
  /// A fold on top of the stack takes over. Finalizers on top run as one batch before the
  /// settlement continues below them; finalizers at the bottom of the stack stay there for
  /// [`ChannelExecutor::close`].
  fn settle(&mut self, exit: ChannelExit) -> Option<ChannelState> {
    loop {
      match self.stack.pop() {
        | None => return Some(self.finish(exit)),
        | Some(Continuation::Fold { on_success, on_failure }) => {
          self.current = Some(match exit {
            | Ok(value) => guarded(|| on_success(value)),
            | Err(cause) => guarded(|| on_failure(cause)),
          });
          return None;
        },
        | Some(Continuation::Finalizer(first)) => {
          let mut finalizers = vec![first];
          while matches!(self.stack.last(), Some(Continuation::Finalizer(_))) {
            if let Some(Continuation::Finalizer(next)) = self.stack.pop() {
              finalizers.push(next);
            }
          }
          if self.stack.is_empty() {
            self.stack.extend(finalizers.into_iter().rev().map(Continuation::Finalizer));
            return Some(self.finish(exit));
          }
          let effects: Vec<ChannelEffect> =
            finalizers.into_iter().filter_map(|finalizer| self.resolve_finalizer(finalizer, &exit)).collect();
          if effects.is_empty() {
            continue;
          }
          let effect = self.track_batch(effects);
          return self.await_effect(effect, EffectContinuation::ResettleAfterFinalizers(exit));
        },
      }
    }
  }

  fn resolve_finalizer(&mut self, finalizer: Finalizer, exit: &ChannelExit) -> Option<ChannelEffect> {
    match finalizer {
      | Finalizer::Release(release) => Some(match Defect::capture(|| release(exit)) {
        | Ok(effect) => effect.provide(self.environment.clone()),
        | Err(defect) => ChannelEffect::fail_cause(Cause::die(defect)),
      }),
      | Finalizer::RestoreInput { previous } => {
        let left = mem::replace(&mut self.input, previous);
        left.and_then(|left| left.close(exit))
      },
      | Finalizer::RestoreEnvironment { previous } => {
        self.environment = previous;
        None
      },
      | Finalizer::CancelBridge { task, previous } => {
        task.interrupt();
        self.input = previous;
        None
      },
    }
  }

  fn finish(&mut self, exit: ChannelExit) -> ChannelState {
    tracing::debug!(
      target: LOG_TARGET,
      executor = self.id.value(),
      success = exit.is_ok(),
      "channel executor finished"
    );
    self.current = None;
    self.done = Some(exit);
    ChannelState::Done
  }
}

impl core::fmt::Debug for ChannelExecutor {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChannelExecutor")
      .field("id", &self.id)
      .field("current", &self.current)
      .field("stack_depth", &self.stack.len())
      .field("sub_executor", &self.sub_executor.as_ref().map(SubexecutorState::name))
      .field("done", &self.done.is_some())
      .finish_non_exhaustive()
  }
}

/// Runs user code building a program, turning a panic into a failing program.
fn guarded<F>(f: F) -> ChannelProgram
where
  F: FnOnce() -> ChannelProgram, {
  match Defect::capture(f) {
    | Ok(program) => program,
    | Err(defect) => ChannelProgram::FailCause(Cause::die(defect)),
  }
}
