use core::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use super::{ArcShared, InputElement, SpinSyncMutex, async_input_queue::InputQueueState, unit};

/// Future returned by [`AsyncInputQueue::take`](super::AsyncInputQueue::take).
///
/// Once the terminal element has been consumed, further takes resolve to
/// [`InputElement::Done`] with unit.
pub struct InputTakeFuture {
  state: ArcShared<SpinSyncMutex<InputQueueState>>,
}

impl InputTakeFuture {
  pub(crate) const fn new(state: ArcShared<SpinSyncMutex<InputQueueState>>) -> Self {
    Self { state }
  }
}

impl Unpin for InputTakeFuture {}

impl Future for InputTakeFuture {
  type Output = InputElement;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let producer = {
      let mut state = self.state.lock();
      if let Some(element) = state.elements.pop_front() {
        return Poll::Ready(element);
      }
      if state.closed {
        return Poll::Ready(InputElement::Done(unit()));
      }
      state.demand = true;
      state.consumer = Some(cx.waker().clone());
      state.producer.take()
    };
    if let Some(waker) = producer {
      waker.wake();
    }
    Poll::Pending
  }
}
