use pretty_assertions::assert_eq;
use remap_core::{
    ArgumentEntry, ClassEntry, ConstructorEntry, Entry, EntryKind, EntryReference, FieldEntry,
    MethodEntry, Signature, Type,
};

#[test]
fn members_move_between_classes() {
    let field = FieldEntry::new(ClassEntry::new("b"), "f", Type::parse("I").unwrap());
    let moved = Entry::from(field).with_class(ClassEntry::new("a"));
    assert_eq!(moved.class_entry(), &ClassEntry::new("a"));
    assert_eq!(moved.name(), "f");
    assert_eq!(moved.kind(), EntryKind::Field);
}

#[test]
fn arguments_follow_their_behavior() {
    let method = MethodEntry::new(
        ClassEntry::new("a$b"),
        "m",
        Signature::parse("(II)V").unwrap(),
    );
    let arg = ArgumentEntry::new(method, 1, "var2");
    let entry = Entry::from(arg.clone());
    assert_eq!(entry.class_entry(), &ClassEntry::new("a$b"));
    assert_eq!(entry.class_entry().outer_class(), ClassEntry::new("a"));

    let moved = arg.with_class(ClassEntry::new("c"));
    assert_eq!(moved.behavior.class(), &ClassEntry::new("c"));
    assert_eq!(moved.index, 1);
}

#[test]
fn static_initializer_is_a_signatureless_constructor() {
    let clinit = ConstructorEntry::static_initializer(ClassEntry::new("a"));
    assert!(clinit.is_static_initializer());
    assert_eq!(clinit.name(), "<clinit>");
    assert_eq!(clinit.to_string(), "a.<clinit>");

    let init = ConstructorEntry::new(ClassEntry::new("a"), Signature::parse("()V").unwrap());
    assert_eq!(init.to_string(), "a.<init>()V");
}

#[test]
fn references_sort_by_entry_then_context() {
    let target = Entry::from(ClassEntry::new("b"));
    let mut references = vec![
        EntryReference::reference(ClassEntry::new("b"), ClassEntry::new("z"), 2),
        EntryReference::reference(ClassEntry::new("a"), ClassEntry::new("z"), 1),
        EntryReference::declaration(ClassEntry::new("b")),
        EntryReference::reference(ClassEntry::new("b"), ClassEntry::new("z"), 1),
    ];
    references.sort();

    let lower = EntryReference::lower_bound(&target);
    let for_b: Vec<_> = references
        .iter()
        .filter(|reference| **reference >= lower && reference.entry == target)
        .collect();
    assert_eq!(for_b.len(), 3);
    assert!(for_b[0].is_declaration());
    assert_eq!(for_b[1].occurrence, 1);
    assert_eq!(for_b[2].occurrence, 2);
}
