use pretty_assertions::assert_eq;
use remap_convert::{apply_member_matches, compute_member_matches, migrate_mappings, MemberMatches};
use remap_core::{BehaviorEntry, ClassEntry, FieldEntry, MethodEntry, Signature, Type};
use remap_mappings::{MappingsReader, MappingsWriter};
use remap_test_utils::ClassBuilder;

use super::{index, pairs};

fn field(class: &str, name: &str, ty: &str) -> FieldEntry {
    FieldEntry::new(ClassEntry::new(class), name, Type::parse(ty).unwrap())
}

fn method(class: &str, name: &str, signature: &str) -> BehaviorEntry {
    BehaviorEntry::Method(MethodEntry::new(
        ClassEntry::new(class),
        name,
        Signature::parse(signature).unwrap(),
    ))
}

#[test]
fn renamed_fields_carry_their_mapping() {
    let old_package = index(vec![ClassBuilder::new("x").field("f", "I")]);
    let new_package = index(vec![ClassBuilder::new("y").field("g", "I")]);
    let classes = pairs(&[("x", "y")]);
    let old = MappingsReader::read_str("CLASS x Foo\n\tFIELD f count I\n").unwrap();

    let mut migrated = migrate_mappings(&old, &classes).unwrap();
    let matches: MemberMatches<FieldEntry> =
        compute_member_matches(&old_package, &new_package, &migrated, &classes);
    assert_eq!(
        matches.dest_for(&field("x", "f", "I")),
        Some(&field("y", "g", "I"))
    );

    apply_member_matches(&mut migrated, &matches, &classes).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "CLASS y Foo\n\tFIELD g count I\n"
    );
}

#[test]
fn unmapped_members_are_matched_but_not_migrated() {
    let old_package = index(vec![ClassBuilder::new("x").field("f", "I").field("h", "J")]);
    let new_package = index(vec![ClassBuilder::new("y").field("f", "I").field("k", "J")]);
    let classes = pairs(&[("x", "y")]);
    let old = MappingsReader::read_str("CLASS x Foo\n\tFIELD f count I\n").unwrap();

    let mut migrated = migrate_mappings(&old, &classes).unwrap();
    let matches: MemberMatches<FieldEntry> =
        compute_member_matches(&old_package, &new_package, &migrated, &classes);
    assert_eq!(
        matches.dest_for(&field("x", "f", "I")),
        Some(&field("y", "f", "I"))
    );
    assert_eq!(
        matches.dest_for(&field("x", "h", "J")),
        Some(&field("y", "k", "J"))
    );

    apply_member_matches(&mut migrated, &matches, &classes).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "CLASS y Foo\n\tFIELD f count I\n"
    );
}

#[test]
fn members_without_a_candidate_are_unmatchable() {
    let old_package = index(vec![ClassBuilder::new("x").field("f", "I").field("h", "J")]);
    let new_package = index(vec![ClassBuilder::new("y").field("g", "I")]);
    let classes = pairs(&[("x", "y")]);
    let migrated = migrate_mappings(
        &MappingsReader::read_str("CLASS x Foo\n\tFIELD h big J\n").unwrap(),
        &classes,
    )
    .unwrap();

    let matches: MemberMatches<FieldEntry> =
        compute_member_matches(&old_package, &new_package, &migrated, &classes);
    assert!(matches
        .unmatchable_source_entries()
        .contains(&field("x", "h", "J")));
    assert_eq!(
        matches.dest_for(&field("x", "f", "I")),
        Some(&field("y", "g", "I"))
    );
}

#[test]
fn several_candidates_leave_the_member_unmatched() {
    let old_package = index(vec![ClassBuilder::new("x").field("f", "I")]);
    let new_package = index(vec![ClassBuilder::new("y").field("g", "I").field("h", "I")]);
    let classes = pairs(&[("x", "y")]);
    let migrated = migrate_mappings(
        &MappingsReader::read_str("CLASS x Foo\n\tFIELD f count I\n").unwrap(),
        &classes,
    )
    .unwrap();

    let matches: MemberMatches<FieldEntry> =
        compute_member_matches(&old_package, &new_package, &migrated, &classes);
    assert!(matches.is_unmatched_source(&field("x", "f", "I")));
    assert_eq!(
        matches
            .unmatched_dest_entries(&ClassEntry::new("y"))
            .count(),
        2
    );
}

#[test]
fn method_signatures_are_compared_across_versions() {
    let old_package = index(vec![
        ClassBuilder::new("x").method("m", "(Lx;)V").method("n", "()I"),
    ]);
    let new_package = index(vec![
        ClassBuilder::new("y").method("p", "(Ly;)V").method("q", "()I"),
    ]);
    let classes = pairs(&[("x", "y")]);
    let old = MappingsReader::read_str("CLASS x Foo\n\tMETHOD m merge (Lx;)V\n").unwrap();

    let mut migrated = migrate_mappings(&old, &classes).unwrap();
    let matches: MemberMatches<BehaviorEntry> =
        compute_member_matches(&old_package, &new_package, &migrated, &classes);
    assert_eq!(
        matches.dest_for(&method("x", "m", "(Lx;)V")),
        Some(&method("y", "p", "(Ly;)V"))
    );
    assert_eq!(
        matches.dest_for(&method("x", "n", "()I")),
        Some(&method("y", "q", "()I"))
    );

    apply_member_matches(&mut migrated, &matches, &classes).unwrap();
    assert_eq!(
        MappingsWriter::write_string(&migrated),
        "CLASS y Foo\n\tMETHOD p merge (Ly;)V\n"
    );
}
