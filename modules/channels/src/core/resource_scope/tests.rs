use std::sync::{Arc, Mutex};

use super::ResourceScope;
use crate::core::{Cause, ChannelEffect, ChannelExit, unit};

#[derive(Debug, PartialEq)]
struct ReleaseFailed(u32);

fn record(
  log: &Arc<Mutex<Vec<u32>>>,
  id: u32,
  fail: bool,
) -> impl FnOnce(&ChannelExit) -> ChannelEffect + Send + 'static {
  let log = log.clone();
  move |_| {
    ChannelEffect::sync(move |_| {
      log.lock().unwrap().push(id);
      if fail { Err(Cause::fail(ReleaseFailed(id))) } else { Ok(unit()) }
    })
  }
}

#[tokio::test(flavor = "current_thread")]
async fn close_runs_finalizers_newest_first() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let scope = ResourceScope::new();
  for id in 1..=3 {
    assert!(scope.add(record(&log, id, false)).is_ok());
  }
  assert_eq!(scope.len(), 3);

  assert!(scope.close(&Ok(unit())).await.is_ok());
  assert_eq!(*log.lock().unwrap(), vec![3, 2, 1]);
  assert!(scope.is_closed());
  assert!(scope.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn failures_are_combined_and_never_skip_finalizers() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let scope = ResourceScope::default();
  assert!(scope.add(record(&log, 1, true)).is_ok());
  assert!(scope.add(record(&log, 2, false)).is_ok());
  assert!(scope.add(record(&log, 3, true)).is_ok());

  let cause = scope.close(&Err(Cause::Interrupt)).await.expect_err("combined failure");
  assert_eq!(*log.lock().unwrap(), vec![3, 2, 1]);
  let failed: Vec<_> = cause.failures().into_iter().filter_map(|f| f.downcast_ref::<ReleaseFailed>()).collect();
  assert_eq!(failed, vec![&ReleaseFailed(3), &ReleaseFailed(1)]);
}

#[tokio::test(flavor = "current_thread")]
async fn closed_scope_rejects_new_finalizers() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let scope = ResourceScope::new();
  assert!(scope.close(&Ok(unit())).await.is_ok());
  let rejected = scope.add(record(&log, 1, false)).expect_err("closed");
  assert!(rejected(&Ok(unit())).run(crate::core::Environment::empty()).await.is_ok());
  assert_eq!(*log.lock().unwrap(), vec![1]);
  assert!(scope.close(&Ok(unit())).await.is_ok());
  assert!(format!("{scope:?}").contains("closed: true"));
}
