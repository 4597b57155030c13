use pretty_assertions::assert_eq;
use remap_core::{
    ClassEntry, ConstructorEntry, Entry, EntryReference, FieldEntry, MethodEntry, Signature, Type,
};
use remap_source::{DecompiledClass, Region, SourceIndexBuilder, SourceNode};

fn class(name: &str) -> ClassEntry {
    ClassEntry::new(name)
}

fn method(owner: &str, name: &str, sig: &str) -> MethodEntry {
    MethodEntry::new(class(owner), name, Signature::parse(sig).unwrap())
}

fn count() -> FieldEntry {
    FieldEntry::new(class("a"), "f", Type::parse("I").unwrap())
}

// class a {
//   void r() { f++; f++; }
//   void r(int x) { f++; }
//   a() { f++; }
// }
const SOURCE: &str = "class a {\n  void r() { f++; f++; }\n  void r(int x) { f++; }\n  a() { f++; }\n}\n";

fn decompiled() -> DecompiledClass {
    let ctor = ConstructorEntry::new(class("a"), Signature::parse("()V").unwrap());
    DecompiledClass {
        text: SOURCE.to_owned(),
        nodes: vec![
            SourceNode::declaration(class("a"), Some(Region::new(1, 7, 1, 8))).with_children([
                SourceNode::declaration(method("a", "r", "()V"), Some(Region::new(2, 8, 2, 9)))
                    .with_children([
                        SourceNode::reference(count(), Some(Region::new(2, 14, 2, 15))),
                        SourceNode::reference(count(), Some(Region::new(2, 19, 2, 20))),
                    ]),
                SourceNode::declaration(method("a", "r", "(I)V"), Some(Region::new(3, 8, 3, 9)))
                    .with_children([SourceNode::reference(
                        count(),
                        Some(Region::new(3, 19, 3, 20)),
                    )]),
                SourceNode::declaration(ctor, Some(Region::new(4, 3, 4, 4))).with_children([
                    SourceNode::reference(count(), Some(Region::new(4, 9, 4, 10))),
                ]),
            ]),
        ],
    }
}

#[test]
fn overloads_number_references_independently() {
    let index = SourceIndexBuilder::build(&decompiled());
    let refs: Vec<(String, EntryReference)> = index
        .references()
        .filter(|(_, reference)| !reference.is_declaration())
        .map(|(token, reference)| (index.token_text(token).to_owned(), reference.clone()))
        .collect();

    let ctor = ConstructorEntry::new(class("a"), Signature::parse("()V").unwrap());
    assert_eq!(
        refs,
        vec![
            ("f".to_owned(), EntryReference::reference(count(), method("a", "r", "()V"), 1)),
            ("f".to_owned(), EntryReference::reference(count(), method("a", "r", "()V"), 2)),
            ("f".to_owned(), EntryReference::reference(count(), method("a", "r", "(I)V"), 1)),
            ("f".to_owned(), EntryReference::reference(count(), ctor, 1)),
        ]
    );
    assert_eq!(index.tokens_for_entry(&Entry::Field(count())).len(), 4);
}

#[test]
fn declarations_are_recorded_with_their_spans() {
    let index = SourceIndexBuilder::build(&decompiled());
    let overload = index
        .declaration_token(&Entry::Method(method("a", "r", "(I)V")))
        .unwrap();
    assert_eq!(index.line_number(overload.start()), 3);
    assert_eq!(index.column_number(overload.start()), 8);
    assert_eq!(
        index.entry_at(overload.start()).map(|(_, r)| r.clone()),
        Some(EntryReference::declaration(method("a", "r", "(I)V")))
    );

    let ctor = index
        .declaration_token(&Entry::Constructor(ConstructorEntry::new(
            class("a"),
            Signature::parse("()V").unwrap(),
        )))
        .unwrap();
    assert_eq!(index.token_text(ctor), "a");
}

#[test]
fn inner_class_declarations_open_their_own_scope() {
    // class a { a$b x; class b { a$b y; } a$b z; }
    let text = "class a { a$b x; class b { a$b y; } a$b z; }";
    let inner = class("a$b");
    let decompiled = DecompiledClass {
        text: text.to_owned(),
        nodes: vec![
            SourceNode::declaration(class("a"), Some(Region::new(1, 7, 1, 8))).with_children([
                SourceNode::reference(inner.clone(), Some(Region::new(1, 11, 1, 14))),
                SourceNode::declaration(inner.clone(), Some(Region::new(1, 24, 1, 25)))
                    .with_children([SourceNode::reference(
                        inner.clone(),
                        Some(Region::new(1, 28, 1, 31)),
                    )]),
                SourceNode::reference(inner.clone(), Some(Region::new(1, 37, 1, 40))),
            ]),
        ],
    };
    let index = SourceIndexBuilder::build(&decompiled);

    let refs: Vec<(&str, EntryReference)> = index
        .references()
        .filter(|(_, reference)| !reference.is_declaration())
        .map(|(token, reference)| (index.token_text(token), reference.clone()))
        .collect();
    assert_eq!(
        refs,
        vec![
            ("b", EntryReference::reference(inner.clone(), class("a"), 1)),
            ("b", EntryReference::reference(inner.clone(), inner.clone(), 1)),
            ("b", EntryReference::reference(inner.clone(), class("a"), 2)),
        ]
    );
}

#[test]
fn overlapping_and_misplaced_nodes_are_dropped() {
    let decompiled = DecompiledClass {
        text: "class a {}".to_owned(),
        nodes: vec![
            SourceNode::declaration(class("a"), Some(Region::new(1, 7, 1, 8))).with_children([
                SourceNode::reference(class("a"), Some(Region::new(1, 6, 1, 9))),
                SourceNode::reference(class("a"), Some(Region::new(4, 1, 4, 2))),
            ]),
            SourceNode::reference(class("a"), Some(Region::new(1, 1, 1, 6))),
        ],
    };
    let index = SourceIndexBuilder::build(&decompiled);
    assert_eq!(index.tokens().count(), 1);
}
