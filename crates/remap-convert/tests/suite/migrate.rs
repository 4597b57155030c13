use pretty_assertions::assert_eq;
use remap_convert::{convert_mappings, migrate_mappings, ConvertError};
use remap_mappings::{MappingsError, MappingsReader, MappingsWriter};

use super::pairs;

#[test]
fn class_names_follow_their_match() {
    let old = MappingsReader::read_str("CLASS x Foo\n\tFIELD f count I\n").unwrap();
    let migrated = migrate_mappings(&old, &pairs(&[("x", "y")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "CLASS y Foo\n\tFIELD f count I\n"
    );
}

#[test]
fn member_types_are_rewritten_through_the_matches() {
    let old = MappingsReader::read_str(
        "\
CLASS x Foo
\tFIELD f next Lx;
\tMETHOD m copy (Lz;)Lx;
CLASS z Bar
",
    )
    .unwrap();
    let migrated = migrate_mappings(&old, &pairs(&[("x", "y"), ("z", "w")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "\
CLASS w Bar
CLASS y Foo
\tFIELD f next Ly;
\tMETHOD m copy (Lw;)Ly;
"
    );
}

#[test]
fn unmatched_classes_are_left_behind() {
    let old = MappingsReader::read_str("CLASS x Foo\nCLASS q Lost\n").unwrap();
    let migrated = migrate_mappings(&old, &pairs(&[("x", "y"), ("p", "r")])).unwrap();
    assert_eq!(MappingsWriter::write_string(&migrated), "CLASS y Foo\n");
}

#[test]
fn inner_classes_keep_their_simple_names() {
    let old = MappingsReader::read_str("CLASS a Outer\n\tCLASS b Inner\n").unwrap();
    let migrated = migrate_mappings(&old, &pairs(&[("a", "c"), ("a$b", "c$d")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "CLASS c Outer\n\tCLASS d Inner\n"
    );
}

#[test]
fn renames_run_in_dependency_order() {
    let mut mappings = MappingsReader::read_str("CLASS a A\n\tFIELD f link Lb;\nCLASS b B\n").unwrap();
    convert_mappings(&mut mappings, &pairs(&[("a", "b"), ("b", "c")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&mappings),
        "CLASS b A\n\tFIELD f link Lc;\nCLASS c B\n"
    );
}

#[test]
fn rename_cycles_change_nothing() {
    let text = "CLASS a A\nCLASS b B\n";
    let mut mappings = MappingsReader::read_str(text).unwrap();
    let err = convert_mappings(&mut mappings, &pairs(&[("a", "b"), ("b", "a")])).unwrap_err();

    assert!(matches!(err, ConvertError::RenameCycle { .. }));
    assert_eq!(MappingsWriter::write_string(&mappings), text);
}

#[test]
fn occupied_targets_change_nothing() {
    let text = "CLASS a A\nCLASS b B\n";
    let mut mappings = MappingsReader::read_str(text).unwrap();
    let err = convert_mappings(&mut mappings, &pairs(&[("a", "b")])).unwrap_err();

    assert!(matches!(err, ConvertError::TargetOccupied { .. }));
    assert_eq!(MappingsWriter::write_string(&mappings), text);
}

#[test]
fn inner_classes_travel_with_their_outer_class() {
    let mut mappings = MappingsReader::read_str("CLASS a Alpha\n\tCLASS c Inner\n").unwrap();
    convert_mappings(&mut mappings, &pairs(&[("a", "x"), ("a$c", "x$c")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&mappings),
        "CLASS x Alpha\n\tCLASS c Inner\n"
    );
}

#[test]
fn inner_renames_apply_after_their_outer_class_moved() {
    let mut mappings = MappingsReader::read_str("CLASS a Alpha\n\tCLASS c Inner\n").unwrap();
    convert_mappings(&mut mappings, &pairs(&[("a", "x"), ("a$c", "x$e")])).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&mappings),
        "CLASS x Alpha\n\tCLASS e Inner\n"
    );
}

#[test]
fn a_failing_inner_rename_undoes_the_outer_one() {
    let text = "CLASS a Alpha\n\tCLASS c Inner\n\tCLASS d Other\n";
    let mut mappings = MappingsReader::read_str(text).unwrap();
    let err = convert_mappings(&mut mappings, &pairs(&[("a", "x"), ("a$c", "x$d")])).unwrap_err();

    assert!(matches!(err, ConvertError::TargetOccupied { .. }));
    assert_eq!(MappingsWriter::write_string(&mappings), text);
}

#[test]
fn deobf_name_clashes_change_nothing() {
    let text = "CLASS a Alpha\n\tCLASS c Inner\nCLASS b Beta\n\tCLASS d Inner\n";
    let mut mappings = MappingsReader::read_str(text).unwrap();
    let err = convert_mappings(&mut mappings, &pairs(&[("a$c", "b$e")])).unwrap_err();

    assert!(matches!(
        err,
        ConvertError::Mappings(MappingsError::DuplicateDeobfName { .. })
    ));
    assert_eq!(MappingsWriter::write_string(&mappings), text);
}
