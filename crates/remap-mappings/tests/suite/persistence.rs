use pretty_assertions::assert_eq;
use remap_config::IndexConfig;
use remap_core::{ArgumentEntry, ClassEntry, FieldEntry, MethodEntry, Signature, Type};
use remap_index::PackageIndex;
use remap_mappings::{Mappings, MappingsError, MappingsReader, MappingsWriter, Renamer};
use remap_test_utils::{ClassBuilder, PackageBuilder};

fn renamed_store() -> Mappings {
    let package = PackageBuilder::new()
        .class(
            ClassBuilder::new("a")
                .field("f", "I")
                .field("f", "J")
                .method("m", "(La$b;)V")
                .method("m", "()V"),
        )
        .class(ClassBuilder::new("a$b").method("n", "(II)V"))
        .class(ClassBuilder::new("z"))
        .build();
    let index = PackageIndex::index_package(&package, &IndexConfig::default());

    let mut mappings = Mappings::new();
    let mut renamer = Renamer::new(&index, &mut mappings);
    let a = ClassEntry::new("a");
    let inner = ClassEntry::new("a$b");
    renamer.set_class_name(&a, "com/example/Tree").unwrap();
    renamer.set_class_name(&inner, "Node").unwrap();
    renamer
        .set_field_name(&FieldEntry::new(a.clone(), "f", Type::parse("I").unwrap()), "size")
        .unwrap();
    renamer
        .set_field_name(&FieldEntry::new(a.clone(), "f", Type::parse("J").unwrap()), "hash")
        .unwrap();
    renamer
        .set_method_name(
            &MethodEntry::new(a.clone(), "m", Signature::parse("(La$b;)V").unwrap()),
            "insert",
        )
        .unwrap();
    // Overloads with distinct signatures may share a name.
    renamer
        .set_method_name(
            &MethodEntry::new(a.clone(), "m", Signature::parse("()V").unwrap()),
            "insert",
        )
        .unwrap();
    let n = MethodEntry::new(inner, "n", Signature::parse("(II)V").unwrap());
    renamer
        .set_argument_name(&ArgumentEntry::new(n.clone(), 1, "var2"), "depth")
        .unwrap();
    renamer
        .set_argument_name(&ArgumentEntry::new(n, 0, "var1"), "width")
        .unwrap();
    mappings
}

#[test]
fn written_files_read_back_identically() {
    let mappings = renamed_store();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.mapping");

    MappingsWriter::write_path(&mappings, &path).unwrap();
    let read = MappingsReader::read_path(&path).unwrap();
    assert_eq!(read, mappings);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "\
CLASS a com/example/Tree
\tFIELD f size I
\tFIELD f hash J
\tMETHOD m insert ()V
\tMETHOD m insert (La$b;)V
\tCLASS b Node
\t\tMETHOD n (II)V
\t\t\tARG 0 var1 width
\t\t\tARG 1 var2 depth
"
    );
}

#[test]
fn renaming_an_obfuscated_class_rewrites_signatures() {
    let mut mappings = renamed_store();
    mappings
        .rename_obf_class(&ClassEntry::new("a"), &ClassEntry::new("q"))
        .unwrap();

    assert!(mappings.class_by_obf("a").is_none());
    let tree = mappings.class_by_obf("q").unwrap();
    assert_eq!(tree.deobf_name(), Some("com/example/Tree"));
    assert!(tree
        .method_by_obf("m", &Signature::parse("(Lq$b;)V").unwrap())
        .is_some());
    assert_eq!(
        mappings.class_by_obf("q$b").map(|m| m.obf_full_name()),
        Some("q$b")
    );
    assert_eq!(
        mappings
            .class_by_deobf("com/example/Tree$Node")
            .map(|m| m.obf_full_name()),
        Some("q$b")
    );

    let err = mappings
        .rename_obf_class(&ClassEntry::new("q$b"), &ClassEntry::new("q"))
        .unwrap_err();
    assert!(err.to_string().contains("duplicate obfuscated class"), "{err}");
}

#[test]
fn moving_a_class_onto_a_taken_deobf_name_keeps_the_store() {
    let text = "CLASS a Alpha\n\tCLASS b Node\nCLASS c Gamma\n\tCLASS d Node\nCLASS n Node\n";
    let mut mappings = MappingsReader::read_str(text).unwrap();

    for target in ["c$e", "z"] {
        let err = mappings
            .rename_obf_class(&ClassEntry::new("a$b"), &ClassEntry::new(target))
            .unwrap_err();
        assert!(
            matches!(err, MappingsError::DuplicateDeobfName { ref name, .. } if name == "Node"),
            "{err}"
        );
        assert_eq!(MappingsWriter::write_string(&mappings), text);
    }

    mappings
        .rename_obf_class(&ClassEntry::new("a$b"), &ClassEntry::new("a$x"))
        .unwrap();
    assert_eq!(
        mappings.class_by_deobf("Alpha$Node").map(|m| m.obf_full_name()),
        Some("a$x")
    );
}
