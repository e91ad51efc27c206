use super::pull_upstream;
use crate::core::{
  Cause, ChannelEffect, ChannelExecutor, ChannelProgram, ChannelRuntimeConfig, ExecutorHandle, UpstreamSignal,
  downcast_value,
};

fn handle(program: ChannelProgram) -> ExecutorHandle {
  ExecutorHandle::new(ChannelExecutor::new(program, &ChannelRuntimeConfig::new()))
}

async fn collect_u32(executor: ExecutorHandle) -> (Vec<u32>, Result<(), Cause>) {
  let mut values = Vec::new();
  loop {
    match pull_upstream(executor.clone()).await {
      | UpstreamSignal::Emit(value) => values.push(downcast_value::<u32>(value).expect("u32")),
      | UpstreamSignal::Done(exit) => return (values, exit.map(|_| ())),
    }
  }
}

#[tokio::test(flavor = "current_thread")]
async fn effects_are_awaited_in_place() {
  let program = ChannelProgram::from_effect(ChannelEffect::succeed(4_u32)).and_then(ChannelProgram::emit_dyn);
  let (values, exit) = collect_u32(handle(program)).await;
  assert_eq!(values, vec![4]);
  assert!(exit.is_ok());
}

#[tokio::test(flavor = "current_thread")]
async fn deep_pipe_chains_run_without_recursion() {
  let mut program = ChannelProgram::write_all(vec![1_u32, 2, 3]);
  for _ in 0..500 {
    program = program.pipe_to(ChannelProgram::identity());
  }
  let (values, exit) = collect_u32(handle(program)).await;
  assert_eq!(values, vec![1, 2, 3]);
  assert!(exit.is_ok());
}

#[tokio::test(flavor = "current_thread")]
async fn upstream_failures_reach_the_reader() {
  let program = ChannelProgram::emit(1_u32)
    .and_then(|_| ChannelProgram::fail_cause(Cause::Interrupt))
    .pipe_to(ChannelProgram::identity());
  let (values, exit) = collect_u32(handle(program)).await;
  assert_eq!(values, vec![1]);
  assert!(matches!(exit, Err(Cause::Interrupt)));
}

#[tokio::test(flavor = "current_thread")]
async fn finished_executors_replay_their_outcome() {
  let executor = handle(ChannelProgram::succeed(8_u32));
  let UpstreamSignal::Done(Ok(value)) = pull_upstream(executor.clone()).await else { panic!("expected done") };
  assert_eq!(downcast_value::<u32>(value).expect("u32"), 8);
  assert!(matches!(pull_upstream(executor).await, UpstreamSignal::Done(Ok(value)) if value.is::<()>()));
}
