use super::Defect;

#[test]
fn error_messages_are_stable() {
  assert_eq!(Defect::Timeout.to_string(), "operation timed out");
  assert_eq!(Defect::SpawnerUnavailable.to_string(), "task spawner is unavailable");
  assert_eq!(Defect::TypeMismatch { expected: "u32" }.to_string(), "type mismatch: expected u32");
  assert_eq!(Defect::message("boom").to_string(), "boom");
}

#[test]
fn capture_converts_panics() {
  let result: Result<u32, Defect> = Defect::capture(|| panic!("exploded"));
  assert_eq!(result, Err(Defect::Panic("exploded".into())));
}

#[test]
fn capture_passes_values_through() {
  assert_eq!(Defect::capture(|| 3_u32), Ok(3));
}
