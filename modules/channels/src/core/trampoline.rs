//! Upstream read trampoline.

use alloc::vec::Vec;

use super::{AsyncInputQueue, Cause, ChannelState, Defect, ExecutorHandle, LOG_TARGET, UpstreamSignal, unit};

#[cfg(test)]
mod tests;

/// Drives `upstream` until it emits or finishes.
///
/// Reads issued by the upstream against its own upstreams are served in the same loop:
/// waiting executors are kept on an explicit stack and resumed with the signal of the
/// executor they read from, so arbitrarily deep pipes and compositions never grow the
/// call stack. Effects are awaited in place and handed back to the executor that asked.
pub async fn pull_upstream(upstream: ExecutorHandle) -> UpstreamSignal {
  let mut waiting: Vec<ExecutorHandle> = Vec::new();
  let mut current = upstream;
  loop {
    let signal = match current.step() {
      | ChannelState::Emit => match current.take_emitted() {
        | Some(value) => UpstreamSignal::Emit(value),
        | None => UpstreamSignal::Done(Err(Cause::die(Defect::message("emit step without an emitted value")))),
      },
      | ChannelState::Done => UpstreamSignal::Done(current.take_done().unwrap_or_else(|| Ok(unit()))),
      | ChannelState::Effect(effect) => {
        let exit = effect.await;
        current.resume_effect(exit);
        continue;
      },
      | ChannelState::Read(next) => {
        tracing::trace!(
          target: LOG_TARGET,
          executor = current.id().value(),
          upstream = next.id().value(),
          depth = waiting.len() + 1,
          "descending into upstream"
        );
        waiting.push(current);
        current = next;
        continue;
      },
    };
    match waiting.pop() {
      | Some(downstream) => {
        downstream.resume_read(signal);
        current = downstream;
      },
      | None => return signal,
    }
  }
}

/// Forwards the outputs of `upstream` into `queue`, one per consumer request.
pub(crate) async fn forward_to_input(upstream: ExecutorHandle, queue: AsyncInputQueue) {
  loop {
    queue.await_read().await;
    if queue.is_closed() {
      return;
    }
    match pull_upstream(upstream.clone()).await {
      | UpstreamSignal::Emit(value) => queue.emit(value),
      | UpstreamSignal::Done(Ok(value)) => {
        queue.done(value);
        return;
      },
      | UpstreamSignal::Done(Err(cause)) => {
        queue.error(cause);
        return;
      },
    }
  }
}
