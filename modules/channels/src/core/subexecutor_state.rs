use alloc::{boxed::Box, collections::VecDeque, vec::Vec};

use super::{DynValue, ExecutorHandle, concat_all_spec::ConcatCallbacks, unit};

#[cfg(test)]
mod tests;

/// Children of one composition together with its callbacks and accumulated result.
///
/// `None` entries in the queue are placeholders: popping one pulls the upstream again.
pub(crate) struct ChildPool {
  pub(crate) callbacks: ConcatCallbacks,
  pub(crate) last_done: Option<DynValue>,
  pub(crate) queue:     VecDeque<Option<ExecutorHandle>>,
}

impl ChildPool {
  pub(crate) const fn new(callbacks: ConcatCallbacks) -> Self {
    Self { callbacks, last_done: None, queue: VecDeque::new() }
  }

  /// Number of queued children, placeholders excluded.
  pub(crate) fn active_children(&self) -> usize {
    self.queue.iter().filter(|entry| entry.is_some()).count()
  }

  pub(crate) fn has_children(&self) -> bool {
    self.queue.iter().any(Option::is_some)
  }

  /// Queues a placeholder when one more child still fits under the bound. The bound counts
  /// the queued children plus the child that was just started.
  pub(crate) fn enqueue_placeholder(&mut self, active_children: usize, pull_front: bool) {
    if active_children + 1 >= self.callbacks.max_active.get() {
      return;
    }
    if pull_front {
      self.queue.push_front(None);
    } else {
      self.queue.push_back(None);
    }
  }

  /// Folds a child's final value into the accumulated result.
  pub(crate) fn fold_child(&mut self, value: DynValue) {
    let next = match self.last_done.take() {
      | Some(previous) => (self.callbacks.combine_children)(previous, value),
      | None => value,
    };
    self.last_done = Some(next);
  }

  /// Combines the accumulated result with the upstream's final value.
  pub(crate) fn complete(&mut self, upstream_done: DynValue) -> DynValue {
    let accumulated = self.last_done.take().unwrap_or_else(unit);
    (self.callbacks.combine_with_done)(accumulated, upstream_done)
  }

  fn drain_into(&mut self, handles: &mut Vec<ExecutorHandle>) {
    handles.extend(self.queue.drain(..).flatten());
  }
}

/// Pulling the upstream, or the front of the child queue.
pub(crate) struct PullFromUpstream {
  pub(crate) upstream: ExecutorHandle,
  pub(crate) pool:     ChildPool,
}

/// Upstream finished; only queued children remain.
pub(crate) struct DrainChildExecutors {
  pub(crate) upstream:      ExecutorHandle,
  pub(crate) upstream_done: DynValue,
  pub(crate) pool:          ChildPool,
}

/// State resumed once the current child yields or finishes.
pub(crate) enum ChildParent {
  Upstream(PullFromUpstream),
  Drain(DrainChildExecutors),
}

impl ChildParent {
  pub(crate) fn pool_mut(&mut self) -> &mut ChildPool {
    match self {
      | Self::Upstream(state) => &mut state.pool,
      | Self::Drain(state) => &mut state.pool,
    }
  }

  pub(crate) fn into_state(self) -> SubexecutorState {
    match self {
      | Self::Upstream(state) => SubexecutorState::PullFromUpstream(state),
      | Self::Drain(state) => SubexecutorState::DrainChildExecutors(state),
    }
  }
}

/// Running one child.
pub(crate) struct PullFromChild {
  pub(crate) child:  ExecutorHandle,
  pub(crate) parent: ChildParent,
}

/// States of the composition driven by a `ConcatAll` program.
///
/// Each transition consumes the previous state. Executors dropped by a transition are
/// closed by the executor before the next state is installed.
pub(crate) enum SubexecutorState {
  PullFromUpstream(PullFromUpstream),
  PullFromChild(PullFromChild),
  DrainChildExecutors(DrainChildExecutors),
  QueuedOutput { value: DynValue, next: Box<SubexecutorState> },
}

impl SubexecutorState {
  pub(crate) const fn name(&self) -> &'static str {
    match self {
      | Self::PullFromUpstream(_) => "PullFromUpstream",
      | Self::PullFromChild(_) => "PullFromChild",
      | Self::DrainChildExecutors(_) => "DrainChildExecutors",
      | Self::QueuedOutput { .. } => "QueuedOutput",
    }
  }

  /// Consumes the state, returning every executor it owns: the running child first, then
  /// queued children, then the upstream.
  pub(crate) fn into_handles(self) -> Vec<ExecutorHandle> {
    let mut handles = Vec::new();
    let mut state = self;
    loop {
      match state {
        | Self::QueuedOutput { next, .. } => state = *next,
        | Self::PullFromChild(running) => {
          handles.push(running.child);
          state = running.parent.into_state();
        },
        | Self::PullFromUpstream(mut pulling) => {
          pulling.pool.drain_into(&mut handles);
          handles.push(pulling.upstream);
          return handles;
        },
        | Self::DrainChildExecutors(mut draining) => {
          draining.pool.drain_into(&mut handles);
          handles.push(draining.upstream);
          return handles;
        },
      }
    }
  }
}
