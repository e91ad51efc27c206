use core::time::Duration;
use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use fraktor_channels_rs::{
  core::{
    AsyncInputQueue, ChannelEffect, ChannelProgram, ChannelRunner, ChildDecision, ConcatAllSpec, Defect, DynValue,
    MergeDecision, downcast_value, unit,
  },
  std::{merge_with, timeout_or_else, tokio_runtime_config, with_timeout},
};

fn as_u32(value: DynValue) -> u32 {
  downcast_value::<u32>(value).expect("u32")
}

fn sleeping(millis: u64, value: u32) -> ChannelEffect {
  ChannelEffect::from_future(async move {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    let value: DynValue = Box::new(value);
    Ok(value)
  })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bridge_moves_upstream_outputs_through_a_queue() {
  let runner = ChannelRunner::new(tokio_runtime_config().expect("runtime"));
  let queue = AsyncInputQueue::new();
  let program = ChannelProgram::write_all(vec![1_u32, 2, 3])
    .and_then(|_| ChannelProgram::succeed(9_u32))
    .pipe_to(ChannelProgram::bridge(queue.clone(), ChannelProgram::from_input(queue.clone())));
  let (outputs, value) = runner.run_collect(program).await.expect("success");
  assert_eq!(outputs.into_iter().map(as_u32).collect::<Vec<_>>(), vec![1, 2, 3]);
  assert_eq!(as_u32(value), 9);
  assert!(queue.is_closed());
}

#[tokio::test(flavor = "current_thread")]
async fn bridge_without_a_spawner_reports_a_defect() {
  let queue = AsyncInputQueue::new();
  let program = ChannelProgram::write_all(vec![1_u32])
    .pipe_to(ChannelProgram::bridge(queue.clone(), ChannelProgram::from_input(queue)));
  let cause = ChannelRunner::default().run(program).await.expect_err("defect");
  assert_eq!(cause.defects(), vec![&Defect::SpawnerUnavailable]);
}

#[tokio::test(flavor = "current_thread")]
async fn timed_out_effects_fail_the_program() {
  let program = ChannelProgram::emit(1_u32)
    .and_then(|_| ChannelProgram::from_effect(with_timeout(sleeping(5_000, 2), Duration::from_millis(20))))
    .and_then(ChannelProgram::emit_dyn);
  let mut outputs = Vec::new();
  let exit = ChannelRunner::default().run_with(program, |value| outputs.push(as_u32(value))).await;
  assert_eq!(outputs, vec![1]);
  assert!(exit.expect_err("timeout").is_timeout());

  let program = ChannelProgram::from_effect(timeout_or_else(
    sleeping(5_000, 2),
    Duration::from_millis(20),
    ChannelEffect::succeed(3_u32),
  ));
  assert_eq!(as_u32(ChannelRunner::default().run(program).await.expect("fallback")), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn effects_inside_children_keep_composition_order() {
  let spec = ConcatAllSpec::new(ChannelProgram::write_all(vec![30_u64, 10, 20]), |value| {
    let millis = downcast_value::<u64>(value).expect("u64");
    ChannelProgram::from_effect(sleeping(millis, millis as u32)).and_then(ChannelProgram::emit_dyn)
  })
  .with_child_decision(|_| ChildDecision::Continue);
  let (outputs, _) = ChannelRunner::default().run_collect(ChannelProgram::concat_all(spec)).await.expect("success");
  assert_eq!(outputs.into_iter().map(as_u32).collect::<Vec<_>>(), vec![30, 10, 20]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn merge_interrupts_the_slower_side_and_runs_its_finalizers() {
  let config = tokio_runtime_config().expect("runtime");
  let released = Arc::new(AtomicBool::new(false));
  let flag = released.clone();
  let right = ChannelProgram::emit(100_u32)
    .and_then(|_| ChannelProgram::from_effect(sleeping(30_000, 0)))
    .ensuring(move |_| {
      ChannelEffect::sync(move |_| {
        flag.store(true, Ordering::SeqCst);
        Ok(unit())
      })
    });
  let outputs = Arc::new(Mutex::new(Vec::new()));
  let sink = outputs.clone();
  let exit = tokio::time::timeout(
    Duration::from_secs(5),
    merge_with(
      &config,
      ChannelProgram::from_effect(sleeping(50, 0)).and_then(|_| ChannelProgram::write_all(vec![1_u32, 2])),
      right,
      |exit| MergeDecision::done(ChannelEffect::from_future(core::future::ready(exit))),
      |_| MergeDecision::await_other(),
      move |value| sink.lock().unwrap().push(as_u32(value)),
    ),
  )
  .await
  .expect("merge finished");
  assert!(exit.is_ok());
  assert!(released.load(Ordering::SeqCst));
  let outputs = outputs.lock().unwrap();
  assert!(outputs.contains(&1) && outputs.contains(&2));
}
