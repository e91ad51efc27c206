use alloc::sync::Arc;
use core::any::{Any, type_name};

use super::ArcShared;

#[cfg(test)]
mod tests;

/// Typed failure carried through a program's declared error channel.
///
/// The payload is shared so that causes can be cloned when finalizers observe them.
#[derive(Clone)]
pub struct Failure {
  payload:   ArcShared<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Failure {
  /// Wraps a typed error.
  #[must_use]
  pub fn new<E>(error: E) -> Self
  where
    E: Any + Send + Sync, {
    let payload: Arc<dyn Any + Send + Sync> = Arc::new(error);
    Self { payload: ArcShared::from(payload), type_name: type_name::<E>() }
  }

  /// Returns the payload when it has type `E`.
  #[must_use]
  pub fn downcast_ref<E>(&self) -> Option<&E>
  where
    E: Any, {
    (*self.payload).downcast_ref::<E>()
  }

  /// Returns the name of the payload type.
  #[must_use]
  pub const fn type_name(&self) -> &'static str {
    self.type_name
  }
}

impl core::fmt::Debug for Failure {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_tuple("Failure").field(&self.type_name).finish()
  }
}
