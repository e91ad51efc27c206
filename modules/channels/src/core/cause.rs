//! Failure cause algebra.

use alloc::{boxed::Box, vec, vec::Vec};
use core::any::Any;

use super::{Defect, Failure};


/// Full description of why a program did not succeed.
///
/// Causes compose: sequential failures (a failing finalizer after a failing body) are kept
/// with [`Cause::then`], concurrent ones (siblings torn down together) with [`Cause::both`].
/// Neither combinator ever discards a non-empty operand.
#[derive(Debug, Clone)]
pub enum Cause {
  /// No failure.
  Empty,
  /// Typed failure from the program's error channel.
  Fail(Failure),
  /// Unexpected defect.
  Die(Defect),
  /// Interruption requested by cancellation.
  Interrupt,
  /// Failures that happened one after another.
  Then(Box<Cause>, Box<Cause>),
  /// Failures that happened concurrently.
  Both(Box<Cause>, Box<Cause>),
}

impl Cause {
  /// Creates a typed failure cause.
  #[must_use]
  pub fn fail<E>(error: E) -> Self
  where
    E: Any + Send + Sync, {
    Self::Fail(Failure::new(error))
  }

  /// Creates a defect cause.
  #[must_use]
  pub const fn die(defect: Defect) -> Self {
    Self::Die(defect)
  }

  /// Sequentially combines two causes, dropping empty operands.
  #[must_use]
  pub fn then(self, other: Self) -> Self {
    match (self.is_empty(), other.is_empty()) {
      | (true, _) => other,
      | (_, true) => self,
      | _ => Self::Then(Box::new(self), Box::new(other)),
    }
  }

  /// Combines two concurrent causes, dropping empty operands.
  #[must_use]
  pub fn both(self, other: Self) -> Self {
    match (self.is_empty(), other.is_empty()) {
      | (true, _) => other,
      | (_, true) => self,
      | _ => Self::Both(Box::new(self), Box::new(other)),
    }
  }

  /// Returns true when the cause holds no failure at all.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.leaves().iter().all(|leaf| matches!(leaf, Self::Empty))
  }

  /// Returns the first typed failure of type `E`, in left-to-right order.
  #[must_use]
  pub fn failure<E>(&self) -> Option<&E>
  where
    E: Any, {
    self.failures().into_iter().find_map(|failure| failure.downcast_ref::<E>())
  }

  /// Returns every typed failure, in left-to-right order.
  #[must_use]
  pub fn failures(&self) -> Vec<&Failure> {
    self
      .leaves()
      .into_iter()
      .filter_map(|leaf| match leaf {
        | Self::Fail(failure) => Some(failure),
        | _ => None,
      })
      .collect()
  }

  /// Returns every defect, in left-to-right order.
  #[must_use]
  pub fn defects(&self) -> Vec<&Defect> {
    self
      .leaves()
      .into_iter()
      .filter_map(|leaf| match leaf {
        | Self::Die(defect) => Some(defect),
        | _ => None,
      })
      .collect()
  }

  /// Returns true when the cause contains an interruption.
  #[must_use]
  pub fn is_interrupted(&self) -> bool {
    self.leaves().iter().any(|leaf| matches!(leaf, Self::Interrupt))
  }

  /// Returns true when interruption is the only thing the cause reports.
  #[must_use]
  pub fn is_interrupted_only(&self) -> bool {
    let leaves = self.leaves();
    leaves.iter().any(|leaf| matches!(leaf, Self::Interrupt))
      && leaves.iter().all(|leaf| matches!(leaf, Self::Interrupt | Self::Empty))
  }

  /// Returns true when the cause contains a timeout defect.
  #[must_use]
  pub fn is_timeout(&self) -> bool {
    self.defects().into_iter().any(|defect| matches!(defect, Defect::Timeout))
  }

  /// Removes interruptions, keeping every other failure.
  #[must_use]
  pub fn strip_interruptions(&self) -> Self {
    self.leaves().into_iter().filter(|leaf| !matches!(leaf, Self::Interrupt)).fold(Self::Empty, |acc, leaf| {
      acc.both(leaf.clone())
    })
  }

  // Composite causes can nest as deep as the pipeline that produced them, so the walk
  // keeps its own stack.
  fn leaves(&self) -> Vec<&Self> {
    let mut leaves = Vec::new();
    let mut pending = vec![self];
    while let Some(cause) = pending.pop() {
      match cause {
        | Self::Then(left, right) | Self::Both(left, right) => {
          pending.push(right);
          pending.push(left);
        },
        | leaf => leaves.push(leaf),
      }
    }
    leaves
  }
}
