use alloc::boxed::Box;

use tokio::{
  sync::{mpsc, oneshot},
  task::JoinHandle,
};

use crate::core::{
  Cause, ChannelEffect, ChannelExit, ChannelProgram, ChannelPuller, ChannelRuntimeConfig, Defect, DynValue,
  LOG_TARGET, MergeDecision, PullOutcome, combine_exits,
};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MergeSide {
  Left,
  Right,
}

impl MergeSide {
  const fn other(self) -> Self {
    match self {
      | Self::Left => Self::Right,
      | Self::Right => Self::Left,
    }
  }
}

enum SideEvent {
  Output(DynValue),
  Finished(MergeSide, ChannelExit),
}

enum MergeState {
  Running,
  Awaiting(Box<dyn FnOnce(ChannelExit) -> ChannelEffect + Send>),
  Stopping(ChannelEffect),
}

/// Runs `left` and `right` concurrently on tokio tasks, forwarding the outputs of both to
/// `on_output` as they arrive.
///
/// The first side to finish consults its decision function with its outcome:
/// [`MergeDecision::Done`] interrupts the other side, waits for its cleanup and runs the
/// given effect; [`MergeDecision::Await`] keeps forwarding the other side's outputs and
/// computes the final effect from its outcome.
pub async fn merge_with<L, R, F>(
  config: &ChannelRuntimeConfig,
  left: ChannelProgram,
  right: ChannelProgram,
  left_done: L,
  right_done: R,
  mut on_output: F,
) -> ChannelExit
where
  L: FnOnce(ChannelExit) -> MergeDecision + Send + 'static,
  R: FnOnce(ChannelExit) -> MergeDecision + Send + 'static,
  F: FnMut(DynValue), {
  let (events, mut received) = mpsc::unbounded_channel();
  let (left_stop, left_stopped) = oneshot::channel();
  let (right_stop, right_stopped) = oneshot::channel();
  let left_task = spawn_side(MergeSide::Left, left, config.clone(), events.clone(), left_stopped);
  let right_task = spawn_side(MergeSide::Right, right, config.clone(), events, right_stopped);
  let mut left_stop = Some(left_stop);
  let mut right_stop = Some(right_stop);
  let mut left_done = Some(left_done);
  let mut right_done = Some(right_done);
  let mut state = MergeState::Running;

  let finalizer = loop {
    let Some(event) = received.recv().await else {
      break match state {
        | MergeState::Stopping(effect) => effect,
        | _ => ChannelEffect::fail_cause(Cause::die(Defect::message("merge sides ended without a decision"))),
      };
    };
    match (event, state) {
      | (SideEvent::Output(value), MergeState::Stopping(effect)) => {
        drop(value);
        state = MergeState::Stopping(effect);
      },
      | (SideEvent::Output(value), current) => {
        on_output(value);
        state = current;
      },
      | (SideEvent::Finished(side, exit), MergeState::Running) => {
        let decision = match side {
          | MergeSide::Left => left_done.take().map(|decide| Defect::capture(|| decide(exit))),
          | MergeSide::Right => right_done.take().map(|decide| Defect::capture(|| decide(exit))),
        };
        let decision = match decision {
          | Some(Ok(decision)) => decision,
          | Some(Err(defect)) => MergeDecision::Done(ChannelEffect::fail_cause(Cause::die(defect))),
          | None => MergeDecision::Done(ChannelEffect::fail_cause(Cause::die(Defect::message(
            "merge side finished twice",
          )))),
        };
        tracing::debug!(target: LOG_TARGET, side = ?side, done = decision.is_done(), "merge side finished");
        state = match decision {
          | MergeDecision::Done(effect) => {
            let stop = match side.other() {
              | MergeSide::Left => left_stop.take(),
              | MergeSide::Right => right_stop.take(),
            };
            if let Some(stop) = stop {
              let _ = stop.send(());
            }
            MergeState::Stopping(effect)
          },
          | MergeDecision::Await(f) => MergeState::Awaiting(f),
        };
      },
      | (SideEvent::Finished(_, exit), MergeState::Awaiting(f)) => {
        break Defect::capture(|| f(exit)).unwrap_or_else(|defect| ChannelEffect::fail_cause(Cause::die(defect)));
      },
      | (SideEvent::Finished(_, _), MergeState::Stopping(effect)) => break effect,
    }
  };

  drop((left_stop, right_stop));
  for task in [left_task, right_task] {
    if let Err(error) = task.await {
      tracing::warn!(target: LOG_TARGET, error = %error, "merge side task ended abnormally");
    }
  }
  finalizer.run(config.environment().clone()).await
}

fn spawn_side(
  side: MergeSide,
  program: ChannelProgram,
  config: ChannelRuntimeConfig,
  events: mpsc::UnboundedSender<SideEvent>,
  mut stopped: oneshot::Receiver<()>,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut puller = ChannelPuller::new(program, &config);
    let exit = loop {
      tokio::select! {
        Ok(()) = &mut stopped => {
          let cleanup = puller.interrupt().await;
          break combine_exits(Err(Cause::Interrupt), cleanup);
        },
        outcome = puller.pull() => match outcome {
          | PullOutcome::Element(value) => {
            if events.send(SideEvent::Output(value)).is_err() {
              let cleanup = puller.interrupt().await;
              break combine_exits(Err(Cause::Interrupt), cleanup);
            }
          },
          | PullOutcome::Done(exit) => {
            let cleanup = puller.close(&exit);
            let cleanup = cleanup.await;
            break combine_exits(exit, cleanup);
          },
        },
      }
    };
    let _ = events.send(SideEvent::Finished(side, exit));
  })
}
