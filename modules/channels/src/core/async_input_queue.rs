//! Single-consumer queue feeding bridged programs.

use alloc::collections::VecDeque;
use core::task::Waker;

use super::{ArcShared, Cause, DynValue, InputAwaitReadFuture, InputElement, InputTakeFuture, SpinSyncMutex};

#[cfg(test)]
mod tests;

pub(crate) struct InputQueueState {
  pub(crate) elements: VecDeque<InputElement>,
  pub(crate) closed:   bool,
  pub(crate) demand:   bool,
  pub(crate) consumer: Option<Waker>,
  pub(crate) producer: Option<Waker>,
}

impl InputQueueState {
  const fn new() -> Self {
    Self { elements: VecDeque::new(), closed: false, demand: false, consumer: None, producer: None }
  }
}

/// Queue that carries an upstream's outputs across a task boundary.
///
/// The producer side waits with [`AsyncInputQueue::await_read`] until the consumer asks
/// for an element, which keeps the bridged upstream from running ahead of its reader.
#[derive(Clone)]
pub struct AsyncInputQueue {
  state: ArcShared<SpinSyncMutex<InputQueueState>>,
}

impl AsyncInputQueue {
  /// Creates an empty queue.
  #[must_use]
  pub fn new() -> Self {
    Self { state: ArcShared::new(SpinSyncMutex::new(InputQueueState::new())) }
  }

  /// Offers an upstream output.
  pub fn emit(&self, value: DynValue) {
    self.push(InputElement::Element(value), false);
  }

  /// Reports an upstream failure. Later offers are ignored.
  pub fn error(&self, cause: Cause) {
    self.push(InputElement::Failed(cause), true);
  }

  /// Reports upstream completion. Later offers are ignored.
  pub fn done(&self, value: DynValue) {
    self.push(InputElement::Done(value), true);
  }

  /// Returns a future resolving once the consumer waits for an element.
  #[must_use]
  pub fn await_read(&self) -> InputAwaitReadFuture {
    InputAwaitReadFuture::new(self.state.clone())
  }

  /// Returns a future resolving to the next element.
  #[must_use]
  pub fn take(&self) -> InputTakeFuture {
    InputTakeFuture::new(self.state.clone())
  }

  /// Returns the number of buffered elements.
  #[must_use]
  pub fn len(&self) -> usize {
    self.state.lock().elements.len()
  }

  /// Returns true when nothing is buffered.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns true once a terminal element was offered.
  #[must_use]
  pub fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  fn push(&self, element: InputElement, terminal: bool) {
    let waker = {
      let mut state = self.state.lock();
      if state.closed {
        return;
      }
      state.elements.push_back(element);
      state.demand = false;
      state.closed = terminal;
      state.consumer.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl Default for AsyncInputQueue {
  fn default() -> Self {
    Self::new()
  }
}
