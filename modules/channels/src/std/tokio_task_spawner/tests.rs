use core::time::Duration;

use tokio::sync::oneshot;

use super::{TokioTaskSpawner, tokio_runtime_config};
use crate::core::{TaskHandle, TaskSpawner};

async fn wait_finished(handle: &dyn TaskHandle) -> bool {
  for _ in 0..100 {
    if handle.is_finished() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
  false
}

#[tokio::test(flavor = "current_thread")]
async fn spawned_task_runs_to_completion() {
  let spawner = TokioTaskSpawner::try_current().expect("runtime");
  let (sender, receiver) = oneshot::channel();
  let handle = spawner.spawn(Box::pin(async move {
    let _ = sender.send(7_u32);
  }));
  assert_eq!(receiver.await.expect("value"), 7);
  assert!(wait_finished(&*handle).await);
}

#[tokio::test(flavor = "current_thread")]
async fn interrupt_aborts_a_pending_task() {
  let spawner = TokioTaskSpawner::try_current().expect("runtime");
  let (sender, receiver) = oneshot::channel::<()>();
  let handle = spawner.spawn(Box::pin(async move {
    tokio::time::sleep(Duration::from_secs(30)).await;
    let _ = sender.send(());
  }));
  assert!(!handle.is_finished());
  handle.interrupt();
  assert!(wait_finished(&*handle).await);
  assert!(receiver.await.is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn runtime_config_carries_a_spawner() {
  let config = tokio_runtime_config().expect("runtime");
  assert!(config.spawner().is_some());
  assert!(config.environment().is_empty());
}

#[test]
fn outside_a_runtime_no_spawner_is_available() {
  assert!(TokioTaskSpawner::try_current().is_err());
  assert!(tokio_runtime_config().is_err());
}
