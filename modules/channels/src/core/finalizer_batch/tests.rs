use std::sync::{Arc, Mutex};

use super::FinalizerBatch;
use crate::core::{ChannelEffect, Environment};

#[derive(Debug, PartialEq)]
struct ReleaseFailed(u32);

fn recording(log: &Arc<Mutex<Vec<u32>>>, id: u32, fail: bool) -> ChannelEffect {
  let log = log.clone();
  ChannelEffect::sync(move |_| {
    log.lock().unwrap().push(id);
    if fail { Err(crate::core::Cause::fail(ReleaseFailed(id))) } else { Ok(crate::core::unit()) }
  })
}

#[tokio::test(flavor = "current_thread")]
async fn failing_effect_does_not_stop_the_rest() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let batch = FinalizerBatch::new(vec![recording(&log, 3, true), recording(&log, 2, false), recording(&log, 1, true)]);
  let cause = batch.into_effect().run(Environment::empty()).await.expect_err("combined failure");
  assert_eq!(*log.lock().unwrap(), vec![3, 2, 1]);
  let failures: Vec<_> = cause.failures().into_iter().filter_map(|f| f.downcast_ref::<ReleaseFailed>()).collect();
  assert_eq!(failures, vec![&ReleaseFailed(3), &ReleaseFailed(1)]);
}

#[tokio::test(flavor = "current_thread")]
async fn shared_queue_runs_each_effect_once() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let batch = FinalizerBatch::new(vec![recording(&log, 1, false)]);
  let first = batch.clone();
  assert!(!batch.is_empty());
  assert!(first.into_effect().run(Environment::empty()).await.is_ok());
  assert!(batch.is_empty());
  assert!(batch.into_effect().run(Environment::empty()).await.is_ok());
  assert_eq!(*log.lock().unwrap(), vec![1]);
}

#[tokio::test(flavor = "current_thread")]
async fn extended_effects_run_after_the_leftovers() {
  let log = Arc::new(Mutex::new(Vec::new()));
  let batch = FinalizerBatch::new(vec![recording(&log, 1, false)]);
  batch.extend(vec![recording(&log, 2, false)]);
  assert!(batch.clone().into_effect().run(Environment::empty()).await.is_ok());
  batch.extend(Vec::new());
  assert!(batch.is_empty());
  assert_eq!(*log.lock().unwrap(), vec![1, 2]);
}
