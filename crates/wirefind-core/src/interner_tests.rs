use crate::Interner;

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();

    let a = interner.intern("Name");
    let b = interner.intern("Name");
    let c = interner.intern("Age");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn resolve_roundtrip() {
    let mut interner = Interner::new();

    let sym = interner.intern("Address");
    assert_eq!(interner.resolve(sym), "Address");
    assert_eq!(interner.try_resolve(sym), Some("Address"));
}

#[test]
fn get_does_not_intern() {
    let mut interner = Interner::new();
    interner.intern("Person");

    assert!(interner.get("Person").is_some());
    assert!(interner.get("Employee").is_none());
    assert_eq!(interner.len(), 1);
}

#[test]
fn symbol_ordering_is_insertion_order() {
    let mut interner = Interner::new();

    let z = interner.intern("z");
    let a = interner.intern("a");

    assert!(z < a);
}
