use super::AsyncInputQueue;
use crate::core::{Cause, InputElement, downcast_value, unit};

#[tokio::test(flavor = "current_thread")]
async fn take_returns_elements_in_order_then_done() {
  let queue = AsyncInputQueue::new();
  queue.emit(Box::new(1_u32));
  queue.emit(Box::new(2_u32));
  queue.done(Box::new("end"));
  assert_eq!(queue.len(), 3);

  let mut values = Vec::new();
  loop {
    match queue.take().await {
      | InputElement::Element(value) => values.push(downcast_value::<u32>(value).expect("u32")),
      | InputElement::Done(value) => {
        assert_eq!(downcast_value::<&str>(value).expect("str"), "end");
        break;
      },
      | InputElement::Failed(cause) => panic!("unexpected failure {cause:?}"),
    }
  }
  assert_eq!(values, vec![1, 2]);
  assert!(matches!(queue.take().await, InputElement::Done(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn offers_after_termination_are_ignored() {
  let queue = AsyncInputQueue::new();
  queue.error(Cause::Interrupt);
  queue.emit(unit());
  assert!(queue.is_closed());
  assert_eq!(queue.len(), 1);
  assert!(matches!(queue.take().await, InputElement::Failed(Cause::Interrupt)));
}

#[tokio::test(flavor = "current_thread")]
async fn producer_waits_for_consumer_demand() {
  let queue = AsyncInputQueue::new();
  let producer = queue.clone();
  let handle = tokio::spawn(async move {
    producer.await_read().await;
    producer.emit(Box::new(42_u32));
  });
  tokio::task::yield_now().await;
  assert!(queue.is_empty());
  let element = queue.take().await;
  handle.await.expect("producer");
  assert!(matches!(element, InputElement::Element(value) if *value.downcast_ref::<u32>().expect("u32") == 42));
}
