use super::ChannelRuntimeConfig;
use crate::core::Environment;

#[test]
fn defaults_are_empty() {
  let config = ChannelRuntimeConfig::default();
  assert!(config.environment().is_empty());
  assert!(config.spawner().is_none());
}

#[test]
fn with_environment_replaces_the_environment() {
  let config = ChannelRuntimeConfig::new().with_environment(Environment::new(9_u32));
  assert_eq!(config.environment().get::<u32>(), Some(&9));
}
