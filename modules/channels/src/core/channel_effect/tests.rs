use super::ChannelEffect;
use crate::core::{Cause, Defect, DynValue, Environment, downcast_value};

#[derive(Debug, PartialEq)]
struct Refused;

#[tokio::test(flavor = "current_thread")]
async fn succeed_and_then_chain_values() {
  let effect = ChannelEffect::succeed(20_u32).and_then(|value| {
    let value = downcast_value::<u32>(value).expect("u32");
    ChannelEffect::succeed(value + 1)
  });
  let exit = effect.run(Environment::empty()).await;
  assert_eq!(downcast_value::<u32>(exit.expect("success")).expect("u32"), 21);
}

#[tokio::test(flavor = "current_thread")]
async fn failure_short_circuits_and_then() {
  let effect = ChannelEffect::fail(Refused).and_then(|_| panic!("must not run"));
  let cause = effect.run(Environment::empty()).await.expect_err("failure");
  assert_eq!(cause.failure::<Refused>(), Some(&Refused));
}

#[tokio::test(flavor = "current_thread")]
async fn sync_reads_environment_and_captures_panics() {
  let effect = ChannelEffect::sync(|environment| {
    let port = *environment.get::<u16>().expect("port");
    Ok(Box::new(port) as DynValue)
  });
  let exit = effect.run(Environment::new(8080_u16)).await;
  assert_eq!(downcast_value::<u16>(exit.expect("success")).expect("u16"), 8080);

  let panicking = ChannelEffect::sync(|_| panic!("broken finalizer"));
  let cause = panicking.run(Environment::empty()).await.expect_err("defect");
  assert_eq!(cause.defects(), vec![&Defect::Panic("broken finalizer".into())]);
}

#[tokio::test(flavor = "current_thread")]
async fn provide_overrides_the_run_environment() {
  let effect = ChannelEffect::sync(|environment| Ok(Box::new(*environment.get::<u8>().expect("u8")) as DynValue))
    .provide(Environment::new(1_u8));
  let exit = effect.run(Environment::new(2_u8)).await;
  assert_eq!(downcast_value::<u8>(exit.expect("success")).expect("u8"), 1);
  assert!(matches!(ChannelEffect::fail_cause(Cause::Interrupt).run(Environment::empty()).await, Err(Cause::Interrupt)));
}
