use super::DynValue;

/// What a child executor's emission means for the composition that owns it.
#[derive(Debug)]
pub enum ChildDecision {
  /// Keep pulling from the same child.
  Continue,
  /// End the child now, folding the given value into the accumulated result.
  Close(DynValue),
  /// Re-queue the child behind its siblings so another child (or upstream) runs first.
  Yield,
}
