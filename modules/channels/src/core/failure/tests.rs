use super::Failure;

#[derive(Debug, PartialEq)]
struct Boom(u32);

#[test]
fn downcast_recovers_payload() {
  let failure = Failure::new(Boom(3));
  assert_eq!(failure.downcast_ref::<Boom>(), Some(&Boom(3)));
  assert_eq!(failure.downcast_ref::<u32>(), None);
  assert!(failure.type_name().ends_with("Boom"));
}
