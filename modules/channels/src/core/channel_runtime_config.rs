use super::{ArcShared, Environment, TaskSpawner};

#[cfg(test)]
mod tests;

/// Configuration shared by every executor created from one root program.
///
/// Pipe left sides, concatenation upstreams and child executors inherit the spawner and
/// the environment active at the point where they were created.
#[derive(Clone, Default)]
pub struct ChannelRuntimeConfig {
  environment: Environment,
  spawner:     Option<ArcShared<dyn TaskSpawner>>,
}

impl ChannelRuntimeConfig {
  /// Creates a configuration with an empty environment and no spawner.
  #[must_use]
  pub const fn new() -> Self {
    Self { environment: Environment::empty(), spawner: None }
  }

  /// Returns the initial environment.
  #[must_use]
  pub const fn environment(&self) -> &Environment {
    &self.environment
  }

  /// Returns the configured spawner.
  #[must_use]
  pub const fn spawner(&self) -> Option<&ArcShared<dyn TaskSpawner>> {
    self.spawner.as_ref()
  }

  /// Updates the initial environment.
  #[must_use]
  pub fn with_environment(mut self, environment: Environment) -> Self {
    self.environment = environment;
    self
  }

  /// Updates the spawner used for background tasks.
  #[must_use]
  pub fn with_spawner(mut self, spawner: ArcShared<dyn TaskSpawner>) -> Self {
    self.spawner = Some(spawner);
    self
  }
}

impl core::fmt::Debug for ChannelRuntimeConfig {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ChannelRuntimeConfig")
      .field("environment", &self.environment)
      .field("spawner", &self.spawner.is_some())
      .finish()
  }
}
