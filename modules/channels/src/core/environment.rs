use alloc::sync::Arc;
use core::any::Any;

use super::ArcShared;


/// Ambient value made available to effects run by an executor.
///
/// `Provide` programs swap the environment for an inner program and restore the previous
/// one when the inner program exits.
#[derive(Clone, Default)]
pub struct Environment {
  value: Option<ArcShared<dyn Any + Send + Sync>>,
}

impl Environment {
  /// Creates an empty environment.
  #[must_use]
  pub const fn empty() -> Self {
    Self { value: None }
  }

  /// Creates an environment holding `value`.
  #[must_use]
  pub fn new<T>(value: T) -> Self
  where
    T: Any + Send + Sync, {
    let value: Arc<dyn Any + Send + Sync> = Arc::new(value);
    Self { value: Some(ArcShared::from(value)) }
  }

  /// Returns the environment value when it has type `T`.
  #[must_use]
  pub fn get<T>(&self) -> Option<&T>
  where
    T: Any, {
    self.value.as_ref().and_then(|value| (**value).downcast_ref::<T>())
  }

  /// Returns true when no value is provided.
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.value.is_none()
  }
}

impl core::fmt::Debug for Environment {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Environment").field("provided", &self.value.is_some()).finish()
  }
}
