use pretty_assertions::assert_eq;
use proptest::prelude::*;
use remap_config::IndexConfig;
use remap_core::{
    ArgumentEntry, ClassEntry, ConstructorEntry, Entry, EntryReference, FieldEntry, MethodEntry,
    Signature, Type,
};
use remap_index::PackageIndex;
use remap_mappings::{Mappings, Renamer, TranslationDirection};
use remap_test_utils::{ClassBuilder, PackageBuilder};

fn class(name: &str) -> ClassEntry {
    ClassEntry::new(name)
}

fn field(owner: &str, name: &str, ty: &str) -> FieldEntry {
    FieldEntry::new(class(owner), name, Type::parse(ty).unwrap())
}

fn method(owner: &str, name: &str, sig: &str) -> MethodEntry {
    MethodEntry::new(class(owner), name, Signature::parse(sig).unwrap())
}

fn package() -> PackageIndex {
    let package = PackageBuilder::new()
        .class(
            ClassBuilder::new("a")
                .field("f", "I")
                .method("m", "(La;)V")
                .constructor("(I)V"),
        )
        .class(
            ClassBuilder::new("b")
                .superclass("a")
                .field("g", "La;")
                .method("n", "()[La$c;"),
        )
        .class(ClassBuilder::new("a$c").field("x", "[La;"))
        .build();
    PackageIndex::index_package(&package, &IndexConfig::default())
}

fn sample_entries() -> Vec<Entry> {
    vec![
        class("a").into(),
        class("b").into(),
        class("a$c").into(),
        field("a", "f", "I").into(),
        field("b", "f", "I").into(),
        field("b", "g", "La;").into(),
        field("a$c", "x", "[La;").into(),
        method("a", "m", "(La;)V").into(),
        method("b", "m", "(La;)V").into(),
        method("b", "n", "()[La$c;").into(),
        ConstructorEntry::new(class("a"), Signature::parse("(I)V").unwrap()).into(),
        ConstructorEntry::static_initializer(class("b")).into(),
        ArgumentEntry::new(method("a", "m", "(La;)V"), 0, "var0").into(),
        ArgumentEntry::new(method("b", "m", "(La;)V"), 0, "var0").into(),
    ]
}

fn rename_selected(index: &PackageIndex, flags: &[bool]) -> Mappings {
    let mut mappings = Mappings::new();
    let mut renamer = Renamer::new(index, &mut mappings);
    let renames: Vec<(Entry, &str)> = vec![
        (class("a").into(), "Alpha"),
        (class("b").into(), "pkg/Beta"),
        (class("a$c").into(), "Gamma"),
        (field("a", "f", "I").into(), "first"),
        (field("b", "g", "La;").into(), "parent"),
        (method("a", "m", "(La;)V").into(), "merge"),
        (method("b", "n", "()[La$c;").into(), "children"),
        (ArgumentEntry::new(method("a", "m", "(La;)V"), 0, "var0").into(), "other"),
    ];
    for ((entry, name), selected) in renames.iter().zip(flags) {
        if *selected {
            renamer.rename(entry, name).unwrap();
        }
    }
    mappings
}

proptest! {
    #[test]
    fn translation_round_trips(flags in prop::collection::vec(any::<bool>(), 8)) {
        let index = package();
        let mappings = rename_selected(&index, &flags);
        let deobf = mappings.translator(index.translation_index(), TranslationDirection::Deobfuscating);
        let obf = mappings.translator(index.translation_index(), TranslationDirection::Obfuscating);

        for entry in sample_entries() {
            let there = deobf.translate_entry(&entry);
            let back = obf.translate_entry(&there);
            prop_assert_eq!(&back, &entry, "via {}", there);
        }
    }
}

#[test]
fn fully_mapped_entries_translate_everywhere() {
    let index = package();
    let mappings = rename_selected(&index, &[true; 8]);
    let deobf = mappings.translator(index.translation_index(), TranslationDirection::Deobfuscating);

    assert_eq!(
        deobf.translate_entry(&method("b", "m", "(La;)V").into()).to_string(),
        "pkg/Beta.merge(LAlpha;)V"
    );
    assert_eq!(
        deobf.translate_entry(&method("b", "n", "()[La$c;").into()).to_string(),
        "pkg/Beta.children()[LAlpha$Gamma;"
    );
    assert_eq!(
        deobf.translate_entry(&field("b", "f", "I").into()).to_string(),
        "pkg/Beta.first:I"
    );
    let arg = ArgumentEntry::new(method("b", "m", "(La;)V"), 0, "var0");
    match deobf.translate_entry(&arg.into()) {
        Entry::Argument(arg) => assert_eq!(arg.name, "other"),
        other => panic!("expected an argument, got {other}"),
    }
}

#[test]
fn unmapped_components_pass_through() {
    let index = package();
    let mappings = rename_selected(&index, &[false, true, false, false, false, false, false, false]);
    let deobf = mappings.translator(index.translation_index(), TranslationDirection::Deobfuscating);

    assert_eq!(
        deobf.translate_entry(&field("b", "g", "La;").into()).to_string(),
        "pkg/Beta.g:La;"
    );
    assert_eq!(
        deobf.translate_type(&Type::parse("[[Lb;").unwrap()).to_string(),
        "[[Lpkg/Beta;"
    );
    assert_eq!(deobf.translate_signature(None), None);
    assert_eq!(
        deobf.translate_class(&class("java/lang/Object")),
        class("java/lang/Object")
    );
}

#[test]
fn references_translate_entry_and_context() {
    let index = package();
    let mappings = rename_selected(&index, &[true; 8]);
    let deobf = mappings.translator(index.translation_index(), TranslationDirection::Deobfuscating);

    let reference = EntryReference::reference(field("a", "f", "I"), method("b", "n", "()[La$c;"), 2);
    let translated = deobf.translate_reference(&reference);
    assert_eq!(translated.entry.to_string(), "Alpha.first:I");
    assert_eq!(
        translated.context.map(|context| context.to_string()),
        Some("pkg/Beta.children()[LAlpha$Gamma;".to_owned())
    );
    assert_eq!(translated.occurrence, 2);
}
