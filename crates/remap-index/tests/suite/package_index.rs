use pretty_assertions::assert_eq;
use remap_config::IndexConfig;
use remap_core::{BehaviorEntry, ClassEntry, ConstructorEntry, Signature};
use remap_index::PackageIndex;
use remap_test_utils::{ClassBuilder, PackageBuilder};

#[test]
fn records_keep_library_superclass_and_declaration_order() {
    let package = PackageBuilder::new()
        .class(
            ClassBuilder::new("a")
                .superclass("java/lang/Thread")
                .interface("java/lang/Runnable")
                .field("z", "I")
                .field("y", "La;")
                .constructor("()V")
                .reference("b"),
        )
        .class(ClassBuilder::new("b"))
        .build();
    let index = PackageIndex::index_package(&package, &IndexConfig::default());

    let a = ClassEntry::new("a");
    let record = index.class_record(&a).unwrap();
    assert_eq!(record.superclass, Some(ClassEntry::new("java/lang/Thread")));
    assert_eq!(record.interfaces, vec![ClassEntry::new("java/lang/Runnable")]);
    assert_eq!(record.references, vec![ClassEntry::new("b")]);

    let names: Vec<_> = index
        .obf_field_entries(&a)
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(names, vec!["z", "y"]);

    // The translation index drops the library edge.
    assert_eq!(index.translation_index().superclass(&a), None);

    assert!(index.contains_obf_class(&a));
    assert!(index.contains_obf_field_named(&a, "y"));
    assert!(!index.contains_obf_field_named(&a, "x"));
    assert!(index.contains_obf_behavior(&BehaviorEntry::Constructor(ConstructorEntry::new(
        a.clone(),
        Signature::parse("()V").unwrap()
    ))));
    assert_eq!(
        index.obf_class_entries().cloned().collect::<Vec<_>>(),
        vec![ClassEntry::new("a"), ClassEntry::new("b")]
    );
    assert!(index.obf_behavior_entries(&ClassEntry::new("missing")).is_empty());
}

#[test]
fn custom_library_packages() {
    let config = IndexConfig {
        library_packages: vec!["com/vendor".to_owned()],
    };
    let package = PackageBuilder::new()
        .class(ClassBuilder::new("a").superclass("com/vendor/Base"))
        .class(ClassBuilder::new("b").superclass("java/lang/Object"))
        .build();
    let index = PackageIndex::index_package(&package, &config);
    let translation = index.translation_index();
    assert_eq!(translation.superclass(&ClassEntry::new("a")), None);
    assert_eq!(
        translation.superclass(&ClassEntry::new("b")),
        Some(&ClassEntry::new("java/lang/Object"))
    );
}
