use super::{ArcShared, BoxFuture, TaskHandle};

/// Forks background tasks for executors that need one (bridged inputs).
///
/// The engine never blocks a thread; anything that must make progress independently of
/// the driver is handed to a spawner.
pub trait TaskSpawner: Send + Sync {
  /// Spawns `task` and returns a handle that can interrupt it.
  fn spawn(&self, task: BoxFuture<()>) -> ArcShared<dyn TaskHandle>;
}
