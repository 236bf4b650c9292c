use fibber_deflate::Encoding;

#[test]
fn grammar_builds_for_both_encodings() {
    let packed = crate::build(Encoding::Packed);
    let plain = crate::build(Encoding::Plain);

    // Same rules, same layout; only the pool bytes differ.
    assert_eq!(packed.len(), plain.len());
    assert_eq!(packed.entry(), plain.entry());
    assert_eq!(packed.pool().len(), plain.pool().len());
    assert_eq!(packed.pool().encoding(), Encoding::Packed);
    assert_eq!(plain.pool().encoding(), Encoding::Plain);
}

#[test]
fn shared_instances_are_built_once() {
    assert!(std::ptr::eq(crate::packed(), crate::packed()));
    assert!(std::ptr::eq(crate::plain(), crate::plain()));
}
