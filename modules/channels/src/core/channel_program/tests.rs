use super::ChannelProgram;
use crate::core::{Cause, ChannelEffect, ConcatAllSpec, DynValue, Environment, unit};

fn name(program: &ChannelProgram) -> String {
  format!("{program:?}")
}

#[test]
fn builders_produce_the_expected_variants() {
  assert_eq!(name(&ChannelProgram::emit(1_u8)), "ChannelProgram(\"Emit\")");
  assert_eq!(name(&ChannelProgram::write_all(vec![1_u8, 2])), "ChannelProgram(\"Suspend\")");
  assert_eq!(name(&ChannelProgram::succeed(1_u8)), "ChannelProgram(\"SucceedNow\")");
  assert_eq!(name(&ChannelProgram::succeed_with(|| 1_u8)), "ChannelProgram(\"Succeed\")");
  assert_eq!(name(&ChannelProgram::fail_with(|| Cause::Interrupt)), "ChannelProgram(\"Fail\")");
  assert_eq!(name(&ChannelProgram::identity()), "ChannelProgram(\"Read\")");
  assert_eq!(name(&ChannelProgram::from_effect(ChannelEffect::unit())), "ChannelProgram(\"FromEffect\")");
  assert_eq!(name(&ChannelProgram::unit().provide(Environment::empty())), "ChannelProgram(\"Provide\")");
  assert_eq!(name(&ChannelProgram::unit().pipe_to(ChannelProgram::identity())), "ChannelProgram(\"PipeTo\")");
  assert_eq!(name(&ChannelProgram::unit().ensuring(|_| ChannelEffect::unit())), "ChannelProgram(\"Ensuring\")");
  assert_eq!(name(&ChannelProgram::unit().map(|value| value)), "ChannelProgram(\"Fold\")");
  assert_eq!(name(&ChannelProgram::unit().concat_map(|_| ChannelProgram::unit())), "ChannelProgram(\"ConcatAll\")");
}

#[test]
fn from_exit_keeps_the_outcome() {
  let value: DynValue = Box::new(3_u8);
  assert!(matches!(ChannelProgram::from_exit(Ok(value)), ChannelProgram::SucceedNow(v) if v.is::<u8>()));
  assert!(matches!(ChannelProgram::from_exit(Err(Cause::Interrupt)), ChannelProgram::FailCause(Cause::Interrupt)));
}

#[test]
fn write_all_builds_one_emit_per_step() {
  let ChannelProgram::Suspend(thunk) = ChannelProgram::write_all(vec![1_u8, 2]) else { panic!("expected a suspend") };
  let ChannelProgram::Emit { value, next } = thunk() else { panic!("expected an emit") };
  assert_eq!(value.downcast_ref::<u8>(), Some(&1));
  let ChannelProgram::Suspend(thunk) = *next else { panic!("expected the rest to stay suspended") };
  let ChannelProgram::Emit { value, next } = thunk() else { panic!("expected a second emit") };
  assert_eq!(value.downcast_ref::<u8>(), Some(&2));
  let ChannelProgram::Suspend(thunk) = *next else { panic!("expected the end to stay suspended") };
  assert!(matches!(thunk(), ChannelProgram::SucceedNow(ref done) if done.is::<()>()));
}

#[test]
fn dropping_a_large_unstarted_write_does_not_recurse() {
  let ChannelProgram::Suspend(thunk) = ChannelProgram::write_all((0..1_000_000_u32).collect()) else {
    panic!("expected a suspend")
  };
  let ChannelProgram::Emit { next, .. } = thunk() else { panic!("expected an emit") };
  drop(next);
}

#[test]
fn read_with_propagates_failure_and_completion() {
  let ChannelProgram::Read { on_failure, on_done, .. } = ChannelProgram::read_with(|_| ChannelProgram::unit()) else {
    panic!("expected a read")
  };
  assert!(matches!(on_failure(Cause::Interrupt), ChannelProgram::FailCause(Cause::Interrupt)));
  assert!(matches!(on_done(unit()), ChannelProgram::SucceedNow(_)));
}

#[test]
fn concat_all_keeps_its_spec() {
  let spec = ConcatAllSpec::new(ChannelProgram::unit(), |_| ChannelProgram::unit())
    .with_max_active(core::num::NonZeroUsize::new(4).expect("non zero"));
  let ChannelProgram::ConcatAll(spec) = ChannelProgram::concat_all(spec) else { panic!("expected a concat") };
  assert_eq!(spec.max_active().get(), 4);
}
