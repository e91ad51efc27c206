//! Defect definitions.

#[cfg(any(test, feature = "std"))]
extern crate std;

use alloc::string::String;

#[cfg(test)]
mod tests;

/// Unexpected failures raised while interpreting channel programs.
///
/// Defects travel inside [`Cause::Die`](super::Cause::Die) and are handled exactly like
/// typed failures, but combinators are not expected to recover from them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Defect {
  /// A panic was captured while running user code inside a step.
  #[error("panic while interpreting a channel step: {0}")]
  Panic(String),
  /// A type-erased value did not have the expected type.
  #[error("type mismatch: expected {expected}")]
  TypeMismatch {
    /// Name of the expected type.
    expected: &'static str,
  },
  /// An operation exceeded its time budget.
  #[error("operation timed out")]
  Timeout,
  /// A program needed a background task but no spawner is configured.
  #[error("task spawner is unavailable")]
  SpawnerUnavailable,
  /// Free-form defect.
  #[error("{0}")]
  Message(String),
}

impl Defect {
  /// Creates a free-form defect.
  #[must_use]
  pub fn message(message: impl Into<String>) -> Self {
    Self::Message(message.into())
  }

  /// Runs `f`, turning a panic into a [`Defect::Panic`].
  ///
  /// # Errors
  ///
  /// Returns [`Defect::Panic`] when `f` panics.
  #[cfg(any(test, feature = "std"))]
  pub fn capture<T>(f: impl FnOnce() -> T) -> Result<T, Self> {
    use alloc::string::ToString;

    std::panic::catch_unwind(core::panic::AssertUnwindSafe(f)).map_err(|payload| {
      let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
      } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
      } else {
        "unknown panic payload".to_string()
      };
      Self::Panic(message)
    })
  }

  /// Runs `f`. Without unwinding support panics propagate to the caller.
  ///
  /// # Errors
  ///
  /// Never returns an error on this target.
  #[cfg(not(any(test, feature = "std")))]
  pub fn capture<T>(f: impl FnOnce() -> T) -> Result<T, Self> {
    Ok(f())
  }
}
