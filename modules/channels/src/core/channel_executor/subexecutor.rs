use alloc::{boxed::Box, vec, vec::Vec};

use super::{ChannelExecutor, guarded};
use crate::core::{
  Cause, ChannelExit, ChannelState, ChildDecision, Defect, DynValue, ExecutorHandle, LOG_TARGET, UpstreamPullRequest,
  UpstreamSignal,
  effect_continuation::EffectContinuation,
  finalizer_batch::FinalizerBatch,
  pending_read::PendingRead,
  subexecutor_state::{ChildParent, DrainChildExecutors, PullFromChild, PullFromUpstream, SubexecutorState},
  unit,
};

impl ChannelExecutor {
  pub(super) fn drive_subexecutor(&mut self, state: SubexecutorState) -> Option<ChannelState> {
    tracing::trace!(target: LOG_TARGET, executor = self.id.value(), state = state.name(), "driving sub-executor");
    match state {
      | SubexecutorState::QueuedOutput { value, next } => {
        self.sub_executor = Some(*next);
        self.emit_value(value)
      },
      | SubexecutorState::PullFromUpstream(mut pulling) => match pulling.pool.queue.pop_front() {
        | Some(Some(child)) => {
          self.sub_executor =
            Some(SubexecutorState::PullFromChild(PullFromChild { child, parent: ChildParent::Upstream(pulling) }));
          None
        },
        | Some(None) | None => {
          let upstream = pulling.upstream.clone();
          self.sub_executor = Some(SubexecutorState::PullFromUpstream(pulling));
          self.pending_read = Some(PendingRead::Upstream);
          Some(ChannelState::Read(upstream))
        },
      },
      | SubexecutorState::PullFromChild(running) => {
        let child = running.child.clone();
        self.sub_executor = Some(SubexecutorState::PullFromChild(running));
        self.pending_read = Some(PendingRead::Child);
        Some(ChannelState::Read(child))
      },
      | SubexecutorState::DrainChildExecutors(mut draining) => match draining.pool.queue.pop_front() {
        | Some(Some(child)) => {
          self.sub_executor =
            Some(SubexecutorState::PullFromChild(PullFromChild { child, parent: ChildParent::Drain(draining) }));
          None
        },
        | Some(None) => {
          self.sub_executor = Some(SubexecutorState::DrainChildExecutors(draining));
          None
        },
        | None => {
          let DrainChildExecutors { upstream, upstream_done, mut pool } = draining;
          let exit = Defect::capture(|| pool.complete(upstream_done)).map_err(Cause::die);
          self.finish_subexecutor(exit, vec![upstream])
        },
      },
    }
  }

  pub(super) fn on_upstream_signal(
    &mut self,
    mut pulling: PullFromUpstream,
    signal: UpstreamSignal,
  ) -> Option<ChannelState> {
    match signal {
      | UpstreamSignal::Emit(value) => {
        let callbacks = &mut pulling.pool.callbacks;
        let program = guarded(|| (callbacks.child)(value));
        let child = ExecutorHandle::new(self.derive(program));
        let active_children = pulling.pool.active_children();
        let request = UpstreamPullRequest::Pulled { active_children };
        let on_pull = &mut pulling.pool.callbacks.on_pull;
        let strategy = match Defect::capture(|| on_pull(request)) {
          | Ok(strategy) => strategy,
          | Err(defect) => {
            let mut handles = vec![child];
            handles.extend(SubexecutorState::PullFromUpstream(pulling).into_handles());
            return self.finish_subexecutor(Err(Cause::die(defect)), handles);
          },
        };
        let (separator, pull_front) = strategy.into_parts();
        pulling.pool.enqueue_placeholder(active_children, pull_front);
        tracing::debug!(
          target: LOG_TARGET,
          executor = self.id.value(),
          child = child.id().value(),
          active_children,
          "child executor started"
        );
        let next = SubexecutorState::PullFromChild(PullFromChild { child, parent: ChildParent::Upstream(pulling) });
        self.sub_executor = Some(queue_output(separator, next));
        None
      },
      | UpstreamSignal::Done(Ok(upstream_done)) => {
        if !pulling.pool.has_children() {
          let PullFromUpstream { upstream, mut pool } = pulling;
          let exit = Defect::capture(|| pool.complete(upstream_done)).map_err(Cause::die);
          return self.finish_subexecutor(exit, vec![upstream]);
        }
        let request = UpstreamPullRequest::NoUpstream { active_children: pulling.pool.active_children() };
        let on_pull = &mut pulling.pool.callbacks.on_pull;
        match Defect::capture(|| on_pull(request)) {
          | Ok(strategy) => {
            let (separator, _) = strategy.into_parts();
            let PullFromUpstream { upstream, pool } = pulling;
            tracing::debug!(target: LOG_TARGET, executor = self.id.value(), "upstream exhausted, draining children");
            let next = SubexecutorState::DrainChildExecutors(DrainChildExecutors { upstream, upstream_done, pool });
            self.sub_executor = Some(queue_output(separator, next));
            None
          },
          | Err(defect) => {
            self.finish_subexecutor(Err(Cause::die(defect)), SubexecutorState::PullFromUpstream(pulling).into_handles())
          },
        }
      },
      | UpstreamSignal::Done(Err(cause)) => {
        self.finish_subexecutor(Err(cause), SubexecutorState::PullFromUpstream(pulling).into_handles())
      },
    }
  }

  pub(super) fn on_child_signal(&mut self, running: PullFromChild, signal: UpstreamSignal) -> Option<ChannelState> {
    let PullFromChild { child, mut parent } = running;
    match signal {
      | UpstreamSignal::Emit(value) => {
        let on_emit = &mut parent.pool_mut().callbacks.on_emit;
        match Defect::capture(|| on_emit(&value)) {
          | Ok(ChildDecision::Continue) => {
            self.sub_executor = Some(SubexecutorState::PullFromChild(PullFromChild { child, parent }));
            self.emit_value(value)
          },
          | Ok(ChildDecision::Yield) => {
            parent.pool_mut().queue.push_back(Some(child));
            self.sub_executor = Some(parent.into_state());
            self.emit_value(value)
          },
          | Ok(ChildDecision::Close(result)) => {
            let pool = parent.pool_mut();
            match Defect::capture(|| pool.fold_child(result)) {
              | Ok(()) => {
                let next = SubexecutorState::QueuedOutput { value, next: Box::new(parent.into_state()) };
                self.close_child(child, Err(Cause::Interrupt), next)
              },
              | Err(defect) => self.fail_children(child, parent, Cause::die(defect)),
            }
          },
          | Err(defect) => self.fail_children(child, parent, Cause::die(defect)),
        }
      },
      | UpstreamSignal::Done(Ok(result)) => {
        let pool = parent.pool_mut();
        match Defect::capture(|| pool.fold_child(result)) {
          | Ok(()) => self.close_child(child, Ok(unit()), parent.into_state()),
          | Err(defect) => self.fail_children(child, parent, Cause::die(defect)),
        }
      },
      | UpstreamSignal::Done(Err(cause)) => self.fail_children(child, parent, cause),
    }
  }

  pub(super) fn lost_subexecutor(&mut self, state: Option<SubexecutorState>) -> Option<ChannelState> {
    let handles = state.map(SubexecutorState::into_handles).unwrap_or_default();
    let cause = Cause::die(Defect::message("sub-executor state does not match the pending read"));
    self.finish_subexecutor(Err(cause), handles)
  }

  /// Closes a child that is done, then resumes with `next`.
  ///
  /// The child stays in `closing` until its cleanup has run, so an abandoned close can
  /// still be finished by [`ChannelExecutor::close`].
  fn close_child(&mut self, child: ExecutorHandle, exit: ChannelExit, next: SubexecutorState) -> Option<ChannelState> {
    tracing::debug!(
      target: LOG_TARGET,
      executor = self.id.value(),
      child = child.id().value(),
      "closing child executor"
    );
    match child.close(&exit) {
      | None => {
        self.sub_executor = Some(next);
        None
      },
      | Some(effect) => {
        self.closing = vec![child];
        self.await_effect(effect, EffectContinuation::ResumeSubexecutor(next))
      },
    }
  }

  fn fail_children(&mut self, child: ExecutorHandle, parent: ChildParent, cause: Cause) -> Option<ChannelState> {
    let mut handles = vec![child];
    handles.extend(parent.into_state().into_handles());
    self.finish_subexecutor(Err(cause), handles)
  }

  /// Closes every executor the composition still owns, then settles with `exit`.
  ///
  /// On failure the remaining executors are closed as interrupted, so the composition's
  /// own cause stays primary.
  pub(super) fn finish_subexecutor(&mut self, exit: ChannelExit, handles: Vec<ExecutorHandle>) -> Option<ChannelState> {
    let cleanup_exit: ChannelExit = match &exit {
      | Ok(_) => Ok(unit()),
      | Err(_) => Err(Cause::Interrupt),
    };
    tracing::debug!(
      target: LOG_TARGET,
      executor = self.id.value(),
      executors = handles.len(),
      success = exit.is_ok(),
      "sub-executor finished"
    );
    let effects: Vec<_> = handles.iter().filter_map(|handle| handle.close(&cleanup_exit)).collect();
    if effects.is_empty() {
      return self.settle(exit);
    }
    self.closing = handles;
    self.await_effect(FinalizerBatch::new(effects).into_effect(), EffectContinuation::FinishSubexecutor(exit))
  }
}

fn queue_output(separator: Option<DynValue>, next: SubexecutorState) -> SubexecutorState {
  match separator {
    | Some(value) => SubexecutorState::QueuedOutput { value, next: Box::new(next) },
    | None => next,
  }
}
