use alloc::sync::Arc;

use super::ArcShared;

#[test]
fn clones_share_the_same_allocation() {
  let shared = ArcShared::new(5_u32);
  let cloned = shared.clone();
  assert!(shared.ptr_eq(&cloned));
  assert_eq!(shared.strong_count(), 2);
  assert_eq!(*cloned, 5);
}

#[test]
fn from_arc_keeps_trait_objects() {
  let inner: Arc<dyn Fn() -> u32 + Send + Sync> = Arc::new(|| 7_u32);
  let shared = ArcShared::from(inner);
  assert_eq!((*shared)(), 7);
}
