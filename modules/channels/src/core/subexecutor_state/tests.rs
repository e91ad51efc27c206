use core::num::NonZeroUsize;

use super::{ChildParent, ChildPool, PullFromChild, PullFromUpstream, SubexecutorState};
use crate::core::{ChannelExecutor, ChannelProgram, ChannelRuntimeConfig, ConcatAllSpec, ExecutorHandle, downcast_value};

fn handle() -> ExecutorHandle {
  ExecutorHandle::new(ChannelExecutor::new(ChannelProgram::unit(), &ChannelRuntimeConfig::new()))
}

fn pool(max_active: usize) -> ChildPool {
  let spec = ConcatAllSpec::new(ChannelProgram::unit(), |_| ChannelProgram::unit())
    .with_combine_children(|left, right| {
      Box::new(downcast_value::<u32>(left).expect("u32") * 10 + downcast_value::<u32>(right).expect("u32"))
    })
    .with_max_active(NonZeroUsize::new(max_active).expect("non zero"));
  let (_, callbacks) = spec.into_parts();
  ChildPool::new(callbacks)
}

#[test]
fn placeholders_respect_the_bound() {
  let mut pool = pool(2);
  pool.enqueue_placeholder(0, true);
  assert_eq!(pool.queue.len(), 1);
  pool.queue.push_back(Some(handle()));
  pool.enqueue_placeholder(1, true);
  assert_eq!(pool.queue.len(), 2);
  assert_eq!(pool.active_children(), 1);
  assert!(pool.has_children());

  let mut sequential = self::pool(1);
  sequential.enqueue_placeholder(0, false);
  assert!(sequential.queue.is_empty());
  assert!(!sequential.has_children());
}

#[test]
fn placeholder_position_follows_the_strategy() {
  let mut pool = pool(3);
  pool.queue.push_back(Some(handle()));
  pool.enqueue_placeholder(1, false);
  assert!(pool.queue.back().expect("entry").is_none());
  pool.enqueue_placeholder(1, true);
  assert!(pool.queue.front().expect("entry").is_none());
}

#[test]
fn child_results_are_folded_then_completed() {
  let mut pool = pool(1);
  pool.fold_child(Box::new(1_u32));
  pool.fold_child(Box::new(2_u32));
  assert_eq!(pool.last_done.as_ref().and_then(|value| value.downcast_ref::<u32>()), Some(&12));
  let done = pool.complete(Box::new(7_u32));
  assert_eq!(downcast_value::<u32>(done).expect("u32"), 7);
  assert!(pool.last_done.is_none());
}

#[test]
fn handles_are_listed_child_first_and_upstream_last() {
  let upstream = handle();
  let running = handle();
  let queued = handle();
  let mut pool = pool(2);
  pool.queue.push_back(None);
  pool.queue.push_back(Some(queued.clone()));
  let state = SubexecutorState::QueuedOutput {
    value: Box::new(()),
    next:  Box::new(SubexecutorState::PullFromChild(PullFromChild {
      child:  running.clone(),
      parent: ChildParent::Upstream(PullFromUpstream { upstream: upstream.clone(), pool }),
    })),
  };
  assert_eq!(state.name(), "QueuedOutput");

  let handles = state.into_handles();
  assert_eq!(handles.len(), 3);
  assert!(handles[0].ptr_eq(&running));
  assert!(handles[1].ptr_eq(&queued));
  assert!(handles[2].ptr_eq(&upstream));
}
