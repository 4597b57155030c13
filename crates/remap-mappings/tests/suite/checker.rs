use pretty_assertions::assert_eq;
use remap_config::IndexConfig;
use remap_core::{ClassEntry, FieldEntry, Type};
use remap_index::PackageIndex;
use remap_mappings::{MappingsChecker, MappingsReader, MappingsWriter};
use remap_test_utils::{ClassBuilder, PackageBuilder};

#[test]
fn drops_mappings_missing_from_the_package() {
    let mut mappings = MappingsReader::read_str(
        "\
CLASS a Animal
\tFIELD f legs I
\tFIELD gone lost I
\tMETHOD m speak ()V
\tMETHOD x vanish ()V
\tCLASS b Leg
CLASS c Cat
\tFIELD f fur I
",
    )
    .unwrap();

    let package = PackageBuilder::new()
        .class(ClassBuilder::new("a").field("f", "I").method("m", "()V"))
        .build();
    let index = PackageIndex::index_package(&package, &IndexConfig::default());

    let mut checker = MappingsChecker::new(&index);
    checker.drop_broken_mappings(&mut mappings);

    assert!(checker.dropped_anything());
    assert_eq!(
        checker.dropped_classes(),
        &[ClassEntry::new("a$b"), ClassEntry::new("c")]
    );
    assert_eq!(
        checker.dropped_fields(),
        &[FieldEntry::new(
            ClassEntry::new("a"),
            "gone",
            Type::parse("I").unwrap()
        )]
    );
    assert_eq!(checker.dropped_behaviors().len(), 1);
    assert_eq!(
        MappingsWriter::write_string(&mappings),
        "CLASS a Animal\n\tFIELD f legs I\n\tMETHOD m speak ()V\n"
    );
}
