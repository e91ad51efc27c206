//! `no_std` core of the channel execution engine.

/// Shared pointer wrapper.
mod arc_shared;
/// Bridge input queue.
mod async_input_queue;
/// Failure cause algebra.
mod cause;
/// Child emission decisions.
mod child_decision;
/// Lazily-run effects.
mod channel_effect;
/// Interpreter for channel programs.
mod channel_executor;
/// Downstream pull handle.
mod channel_puller;
/// Channel program AST.
mod channel_program;
/// Program runner entry points.
mod channel_runner;
/// Runtime configuration.
mod channel_runtime_config;
/// Step outcomes.
mod channel_state;
/// Flat-map composition settings.
mod concat_all_spec;
/// Continuation stack entries (internal).
mod continuation;
/// Defect definitions.
mod defect;
/// Effect continuations (internal).
mod effect_continuation;
/// Ambient environment.
mod environment;
/// Executor handle (shared executor).
mod executor_handle;
/// Executor identifier.
mod executor_id;
/// Shared finalizer batches (internal).
mod finalizer_batch;
/// Typed failure payload.
mod failure;
/// Elements delivered through a bridge input.
mod input_element;
/// Future waiting for consumer demand.
mod input_await_read_future;
/// Future taking the next bridge element.
mod input_take_future;
/// Merge decisions.
mod merge_decision;
/// Pending reads (internal).
mod pending_read;
/// Outcome of a downstream pull.
mod pull_outcome;
/// Externally-managed resource scope.
mod resource_scope;
/// Spin lock wrapper.
mod spin_sync_mutex;
/// Sub-executor states (internal).
mod subexecutor_state;
/// Background task handle.
mod task_handle;
/// Background task spawner.
mod task_spawner;
/// Upstream read trampoline.
mod trampoline;
/// Upstream pull requests.
mod upstream_pull_request;
/// Upstream pull strategies.
mod upstream_pull_strategy;
/// Signals produced by reading an upstream.
mod upstream_signal;

use alloc::boxed::Box;
use core::{
  any::{Any, type_name},
  future::Future,
  pin::Pin,
};

pub use arc_shared::ArcShared;
pub use async_input_queue::AsyncInputQueue;
pub use cause::Cause;
pub use channel_effect::ChannelEffect;
pub use channel_executor::ChannelExecutor;
pub use channel_puller::ChannelPuller;
pub use channel_program::{
  ChannelProgram, FailureContinuation, FinalizerFn, ProgramThunk, ReleaseFactory, SuccessContinuation,
};
pub use channel_runner::ChannelRunner;
pub use channel_runtime_config::ChannelRuntimeConfig;
pub use channel_state::ChannelState;
pub use child_decision::ChildDecision;
pub use concat_all_spec::ConcatAllSpec;
pub use defect::Defect;
pub use environment::Environment;
pub use executor_handle::ExecutorHandle;
pub use executor_id::ExecutorId;
pub use failure::Failure;
pub use input_await_read_future::InputAwaitReadFuture;
pub use input_element::InputElement;
pub use input_take_future::InputTakeFuture;
pub use merge_decision::MergeDecision;
pub use pull_outcome::PullOutcome;
pub use resource_scope::ResourceScope;
pub use spin_sync_mutex::SpinSyncMutex;
pub use task_handle::TaskHandle;
pub use task_spawner::TaskSpawner;
pub use trampoline::pull_upstream;
pub use upstream_pull_request::UpstreamPullRequest;
pub use upstream_pull_strategy::UpstreamPullStrategy;
pub use upstream_signal::UpstreamSignal;

/// Type-erased value flowing through channel programs.
pub type DynValue = Box<dyn Any + Send + 'static>;

/// Terminal outcome of a program, an effect or a finalizer.
pub type ChannelExit = Result<DynValue, Cause>;

/// Boxed future used by effects and background tasks.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

pub(crate) const LOG_TARGET: &str = "fraktor::channels";

/// Returns the erased unit value.
#[must_use]
pub fn unit() -> DynValue {
  Box::new(())
}

/// Downcasts an erased value into `T`.
///
/// # Errors
///
/// Returns a [`Defect::TypeMismatch`] cause when the value is not a `T`.
pub fn downcast_value<T>(value: DynValue) -> Result<T, Cause>
where
  T: Any, {
  match value.downcast::<T>() {
    | Ok(value) => Ok(*value),
    | Err(_) => Err(Cause::die(Defect::TypeMismatch { expected: type_name::<T>() })),
  }
}

/// Combines the outcome of a program with the outcome of its cleanup.
///
/// The program's value survives a successful cleanup; failures from both sides are kept.
#[must_use]
pub fn combine_exits(exit: ChannelExit, cleanup: ChannelExit) -> ChannelExit {
  match (exit, cleanup) {
    | (Ok(value), Ok(_)) => Ok(value),
    | (Ok(_), Err(cause)) => Err(cause),
    | (Err(cause), Ok(_)) => Err(cause),
    | (Err(cause), Err(cleanup_cause)) => Err(cause.both(cleanup_cause)),
  }
}
