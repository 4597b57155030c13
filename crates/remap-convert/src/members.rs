use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use remap_core::{BehaviorEntry, ClassEntry, FieldEntry, MethodEntry};
use remap_index::PackageIndex;
use remap_mappings::{ClassMapping, Mappings, MappingsChecker, MappingsError};

use crate::error::ConvertError;
use crate::migrate::order_renames;

/// A kind of class member whose obfuscated name can change between package versions.
pub trait Member: Clone + Ord + fmt::Display {
    fn class(&self) -> &ClassEntry;
    fn name(&self) -> &str;
    fn with_name(&self, name: &str) -> Self;
    fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Self;
    /// Whether both members have the same type or signature and could be one member renamed.
    fn same_shape(&self, other: &Self) -> bool;

    fn declared_in<'i>(index: &'i PackageIndex, class: &ClassEntry) -> &'i [Self];
    fn mapped_in(mapping: &ClassMapping) -> Vec<Self>;
    fn dropped_by(checker: &MappingsChecker<'_>) -> Vec<Self>;
    fn rename_mapping(mapping: &mut ClassMapping, member: &Self, name: &str)
        -> Result<(), MappingsError>;
}

impl Member for FieldEntry {
    fn class(&self) -> &ClassEntry {
        &self.class
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn with_name(&self, name: &str) -> Self {
        FieldEntry::new(self.class.clone(), name, self.ty.clone())
    }

    fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Self {
        FieldEntry::replace_classes(self, replace)
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.class == other.class && self.ty == other.ty
    }

    fn declared_in<'i>(index: &'i PackageIndex, class: &ClassEntry) -> &'i [Self] {
        index.obf_field_entries(class)
    }

    fn mapped_in(mapping: &ClassMapping) -> Vec<Self> {
        let class = mapping.obf_entry();
        mapping.fields().map(|field| field.obf_entry(&class)).collect()
    }

    fn dropped_by(checker: &MappingsChecker<'_>) -> Vec<Self> {
        checker.dropped_fields().to_vec()
    }

    fn rename_mapping(
        mapping: &mut ClassMapping,
        member: &Self,
        name: &str,
    ) -> Result<(), MappingsError> {
        mapping.set_field_obf_name(&member.name, &member.ty, name)
    }
}

impl Member for BehaviorEntry {
    fn class(&self) -> &ClassEntry {
        BehaviorEntry::class(self)
    }

    fn name(&self) -> &str {
        BehaviorEntry::name(self)
    }

    fn with_name(&self, name: &str) -> Self {
        match self {
            BehaviorEntry::Method(method) => BehaviorEntry::Method(MethodEntry::new(
                method.class.clone(),
                name,
                method.signature.clone(),
            )),
            // Constructor names are fixed.
            BehaviorEntry::Constructor(_) => self.clone(),
        }
    }

    fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Self {
        BehaviorEntry::replace_classes(self, replace)
    }

    fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (BehaviorEntry::Method(a), BehaviorEntry::Method(b)) => {
                a.class == b.class && a.signature == b.signature
            }
            (BehaviorEntry::Constructor(a), BehaviorEntry::Constructor(b)) => a == b,
            _ => false,
        }
    }

    fn declared_in<'i>(index: &'i PackageIndex, class: &ClassEntry) -> &'i [Self] {
        index.obf_behavior_entries(class)
    }

    fn mapped_in(mapping: &ClassMapping) -> Vec<Self> {
        let class = mapping.obf_entry();
        mapping.methods().map(|method| method.obf_entry(&class)).collect()
    }

    fn dropped_by(checker: &MappingsChecker<'_>) -> Vec<Self> {
        checker.dropped_behaviors().to_vec()
    }

    fn rename_mapping(
        mapping: &mut ClassMapping,
        member: &Self,
        name: &str,
    ) -> Result<(), MappingsError> {
        match member {
            BehaviorEntry::Method(method) => {
                mapping.set_method_obf_name(&method.name, &method.signature, name)
            }
            BehaviorEntry::Constructor(_) => Ok(()),
        }
    }
}

/// Correspondence between the members of matched classes.
///
/// Sources are named in the old package, dests in the new one. A source is in exactly one of
/// three states: matched, unmatched (still has candidates) or unmatchable (no candidate left).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMatches<T: Member> {
    matches: BTreeMap<T, T>,
    matched_dests: BTreeSet<T>,
    unmatched_sources: BTreeMap<ClassEntry, BTreeSet<T>>,
    unmatched_dests: BTreeMap<ClassEntry, BTreeSet<T>>,
    unmatchable_sources: BTreeSet<T>,
}

impl<T: Member> Default for MemberMatches<T> {
    fn default() -> Self {
        Self {
            matches: BTreeMap::new(),
            matched_dests: BTreeSet::new(),
            unmatched_sources: BTreeMap::new(),
            unmatched_dests: BTreeMap::new(),
            unmatchable_sources: BTreeSet::new(),
        }
    }
}

impl<T: Member> MemberMatches<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_match(&mut self, source: T, dest: T) {
        remove_from(&mut self.unmatched_sources, &source);
        remove_from(&mut self.unmatched_dests, &dest);
        self.unmatchable_sources.remove(&source);
        if let Some(previous) = self.matches.insert(source, dest.clone()) {
            self.matched_dests.remove(&previous);
        }
        self.matched_dests.insert(dest);
    }

    pub fn add_unmatched_source(&mut self, source: T) {
        self.unmatched_sources
            .entry(source.class().clone())
            .or_default()
            .insert(source);
    }

    pub fn add_unmatched_dest(&mut self, dest: T) {
        self.unmatched_dests
            .entry(dest.class().clone())
            .or_default()
            .insert(dest);
    }

    pub fn make_source_unmatchable(&mut self, source: T) {
        remove_from(&mut self.unmatched_sources, &source);
        self.unmatchable_sources.insert(source);
    }

    /// Undoes a match; both members become unmatched again.
    pub fn unmatch(&mut self, source: &T) {
        if let Some(dest) = self.matches.remove(source) {
            self.matched_dests.remove(&dest);
            self.add_unmatched_source(source.clone());
            self.add_unmatched_dest(dest);
        }
    }

    pub fn matches(&self) -> &BTreeMap<T, T> {
        &self.matches
    }

    pub fn dest_for(&self, source: &T) -> Option<&T> {
        self.matches.get(source)
    }

    pub fn is_matched_source(&self, source: &T) -> bool {
        self.matches.contains_key(source)
    }

    pub fn is_matched_dest(&self, dest: &T) -> bool {
        self.matched_dests.contains(dest)
    }

    pub fn is_unmatched_source(&self, source: &T) -> bool {
        self.unmatched_sources
            .get(source.class())
            .is_some_and(|entries| entries.contains(source))
    }

    pub fn unmatched_source_entries(&self, class: &ClassEntry) -> impl Iterator<Item = &T> {
        self.unmatched_sources.get(class).into_iter().flatten()
    }

    pub fn unmatched_dest_entries(&self, class: &ClassEntry) -> impl Iterator<Item = &T> {
        self.unmatched_dests.get(class).into_iter().flatten()
    }

    pub fn source_classes_with_unmatched_entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.unmatched_sources.keys()
    }

    pub fn unmatched_source_count(&self) -> usize {
        self.unmatched_sources.values().map(BTreeSet::len).sum()
    }

    pub fn unmatchable_source_entries(&self) -> &BTreeSet<T> {
        &self.unmatchable_sources
    }
}

fn remove_from<T: Member>(groups: &mut BTreeMap<ClassEntry, BTreeSet<T>>, entry: &T) {
    if let Some(entries) = groups.get_mut(entry.class()) {
        entries.remove(entry);
        if entries.is_empty() {
            groups.remove(entry.class());
        }
    }
}

fn translate<T: Member>(entry: &T, classes: &BTreeMap<String, String>) -> T {
    entry.replace_classes(&mut |name| classes.get(name).cloned())
}

fn dest_to_source(class_matches: &BTreeMap<ClassEntry, ClassEntry>) -> BTreeMap<String, String> {
    class_matches
        .iter()
        .map(|(source, dest)| (dest.name().to_owned(), source.name().to_owned()))
        .collect()
}

/// Pairs the members of matched classes.
///
/// `migrated` holds the old mappings already placed on the dest classes. Mapped members that still
/// exist in `dest` are matched by name; mapped members that vanished and unmapped members of
/// matched source classes are then paired with the unmatched dest member of the same shape when
/// exactly one such candidate exists, and marked unmatchable when none does.
pub fn compute_member_matches<T: Member>(
    source: &PackageIndex,
    dest: &PackageIndex,
    migrated: &Mappings,
    class_matches: &BTreeMap<ClassEntry, ClassEntry>,
) -> MemberMatches<T> {
    let backward = dest_to_source(class_matches);
    let mut out = MemberMatches::new();

    let mut surviving = migrated.clone();
    let mut checker = MappingsChecker::new(dest);
    checker.drop_broken_mappings(&mut surviving);
    for dropped in T::dropped_by(&checker) {
        out.add_unmatched_source(translate(&dropped, &backward));
    }
    for mapping in surviving.all_classes() {
        for entry in T::mapped_in(mapping) {
            out.add_match(translate(&entry, &backward), entry);
        }
    }

    for source_class in class_matches.keys() {
        for entry in T::declared_in(source, source_class) {
            if !out.is_matched_source(entry) && !out.is_unmatched_source(entry) {
                out.add_unmatched_source(entry.clone());
            }
        }
    }
    for dest_class in dest.obf_class_entries() {
        for entry in T::declared_in(dest, dest_class) {
            if !out.is_matched_dest(entry) {
                out.add_unmatched_dest(entry.clone());
            }
        }
    }

    let mut guessed = 0usize;
    let classes: Vec<ClassEntry> = out.source_classes_with_unmatched_entries().cloned().collect();
    for source_class in classes {
        let Some(dest_class) = class_matches.get(&source_class) else {
            continue;
        };
        let entries: Vec<T> = out.unmatched_source_entries(&source_class).cloned().collect();
        for source_entry in entries {
            let candidates: Vec<T> = out
                .unmatched_dest_entries(dest_class)
                .filter(|candidate| translate(*candidate, &backward).same_shape(&source_entry))
                .cloned()
                .collect();
            match candidates.as_slice() {
                [only] => {
                    out.add_match(source_entry, only.clone());
                    guessed += 1;
                }
                [] => out.make_source_unmatchable(source_entry),
                _ => {}
            }
        }
    }

    tracing::info!(
        target = "remap.convert",
        matched = out.matches().len(),
        guessed,
        unmatched = out.unmatched_source_count(),
        unmatchable = out.unmatchable_source_entries().len(),
        "computed member matches"
    );
    out
}

/// Renames member mappings of `mappings` so each mapped member takes the obfuscated name of its
/// matched dest member.
///
/// Renames within a class are ordered so no rename lands on a name another rename still has to
/// vacate. Every class is checked before anything is written; on error `mappings` is unchanged.
pub fn apply_member_matches<T: Member>(
    mappings: &mut Mappings,
    matches: &MemberMatches<T>,
    class_matches: &BTreeMap<ClassEntry, ClassEntry>,
) -> Result<(), ConvertError> {
    let backward = dest_to_source(class_matches);

    let mut plan = Vec::new();
    for mapping in mappings.all_classes() {
        let mapped: BTreeSet<T> = T::mapped_in(mapping).into_iter().collect();
        let mut renames = BTreeMap::new();
        for entry in &mapped {
            let Some(dest) = matches.dest_for(&translate(entry, &backward)) else {
                continue;
            };
            if dest.name() != entry.name() {
                renames.insert(entry.clone(), entry.with_name(dest.name()));
            }
        }
        if renames.is_empty() {
            continue;
        }
        for (from, to) in &renames {
            if mapped.contains(to) && !renames.contains_key(to) {
                return Err(ConvertError::TargetOccupied {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        plan.push((mapping.obf_entry(), order_renames(&renames)?));
    }

    let mut renamed = 0usize;
    for (class, ordered) in plan {
        let Some(mapping) = mappings.class_by_obf_mut(class.name()) else {
            continue;
        };
        for (from, to) in ordered {
            T::rename_mapping(mapping, &from, to.name())?;
            renamed += 1;
        }
    }
    tracing::info!(
        target = "remap.convert",
        renamed,
        "applied member matches"
    );
    Ok(())
}
