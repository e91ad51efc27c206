use core::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use super::{ArcShared, SpinSyncMutex, async_input_queue::InputQueueState};

/// Future returned by [`AsyncInputQueue::await_read`](super::AsyncInputQueue::await_read).
pub struct InputAwaitReadFuture {
  state: ArcShared<SpinSyncMutex<InputQueueState>>,
}

impl InputAwaitReadFuture {
  pub(crate) const fn new(state: ArcShared<SpinSyncMutex<InputQueueState>>) -> Self {
    Self { state }
  }
}

impl Unpin for InputAwaitReadFuture {}

impl Future for InputAwaitReadFuture {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut state = self.state.lock();
    if state.closed || (state.demand && state.elements.is_empty()) {
      return Poll::Ready(());
    }
    state.producer = Some(cx.waker().clone());
    Poll::Pending
  }
}
