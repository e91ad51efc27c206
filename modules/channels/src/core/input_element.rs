use super::{Cause, DynValue};

/// Element travelling through an [`AsyncInputQueue`](super::AsyncInputQueue).
#[derive(Debug)]
pub enum InputElement {
  /// An upstream output.
  Element(DynValue),
  /// The upstream failed.
  Failed(Cause),
  /// The upstream finished with a value.
  Done(DynValue),
}
