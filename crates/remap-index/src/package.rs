use std::collections::{BTreeMap, BTreeSet, VecDeque};

use remap_classfile::ClassStub;
use remap_config::IndexConfig;
use remap_core::{BehaviorEntry, ClassEntry, Entry, FieldEntry, MethodEntry};

use crate::translation::behavior_entry;
use crate::TranslationIndex;

/// What the binary reader reported for one class, in declaration order.
///
/// Unlike the [`TranslationIndex`], the superclass is kept even when it is a library class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub superclass: Option<ClassEntry>,
    pub interfaces: Vec<ClassEntry>,
    pub references: Vec<ClassEntry>,
    pub fields: Vec<FieldEntry>,
    pub behaviors: Vec<BehaviorEntry>,
}

/// The full index of one package version.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    translation: TranslationIndex,
    records: BTreeMap<ClassEntry, ClassRecord>,
    implementors: BTreeMap<ClassEntry, BTreeSet<ClassEntry>>,
}

impl PackageIndex {
    pub fn index_package<'a>(
        stubs: impl IntoIterator<Item = &'a ClassStub>,
        config: &IndexConfig,
    ) -> Self {
        let mut index = PackageIndex::default();
        for stub in stubs {
            index.translation.index_class(stub, config);

            let class = ClassEntry::new(stub.internal_name.as_str());
            let interfaces: Vec<_> = stub
                .interfaces
                .iter()
                .map(|name| ClassEntry::new(name.as_str()))
                .collect();
            for interface in &interfaces {
                index
                    .implementors
                    .entry(interface.clone())
                    .or_default()
                    .insert(class.clone());
            }

            let record = ClassRecord {
                superclass: stub.super_class.as_deref().map(ClassEntry::new),
                interfaces,
                references: stub
                    .references
                    .iter()
                    .map(|name| ClassEntry::new(name.as_str()))
                    .collect(),
                fields: stub
                    .fields
                    .iter()
                    .map(|field| {
                        FieldEntry::new(
                            class.clone(),
                            field.name.as_str(),
                            field.descriptor.clone(),
                        )
                    })
                    .collect(),
                behaviors: stub
                    .methods
                    .iter()
                    .map(|method| behavior_entry(&class, method))
                    .collect(),
            };
            index.records.insert(class, record);
        }

        tracing::debug!(
            target = "remap.index",
            classes = index.records.len(),
            "indexed package"
        );
        index
    }

    pub fn translation_index(&self) -> &TranslationIndex {
        &self.translation
    }

    pub fn contains_obf_class(&self, class: &ClassEntry) -> bool {
        self.records.contains_key(class)
    }

    /// Whether `class` declares any field called `name`, whatever its type.
    pub fn contains_obf_field_named(&self, class: &ClassEntry, name: &str) -> bool {
        self.records
            .get(class)
            .is_some_and(|record| record.fields.iter().any(|field| field.name == name))
    }

    pub fn contains_obf_field(&self, field: &FieldEntry) -> bool {
        self.translation.field_exists(field)
    }

    pub fn contains_obf_behavior(&self, behavior: &BehaviorEntry) -> bool {
        self.translation.behavior_exists(behavior)
    }

    pub fn contains_obf_entry(&self, entry: &Entry) -> bool {
        self.translation.entry_exists(entry)
    }

    /// Every class of the package, in name order.
    pub fn obf_class_entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.records.keys()
    }

    pub fn obf_field_entries(&self, class: &ClassEntry) -> &[FieldEntry] {
        self.records
            .get(class)
            .map(|record| record.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn obf_behavior_entries(&self, class: &ClassEntry) -> &[BehaviorEntry] {
        self.records
            .get(class)
            .map(|record| record.behaviors.as_slice())
            .unwrap_or_default()
    }

    pub fn class_record(&self, class: &ClassEntry) -> Option<&ClassRecord> {
        self.records.get(class)
    }

    /// Direct supertypes inside the package: the superclass and the implemented interfaces.
    fn supertypes(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let Some(record) = self.records.get(class) else {
            return Vec::new();
        };
        record
            .superclass
            .iter()
            .chain(&record.interfaces)
            .filter(|supertype| self.records.contains_key(*supertype))
            .cloned()
            .collect()
    }

    /// Direct subtypes inside the package: subclasses and implementors.
    fn subtypes(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let mut subtypes: BTreeSet<ClassEntry> =
            self.translation.subclasses(class).into_iter().collect();
        if let Some(implementors) = self.implementors.get(class) {
            subtypes.extend(implementors.iter().cloned());
        }
        subtypes.into_iter().collect()
    }

    fn walk(
        &self,
        start: &ClassEntry,
        step: impl Fn(&ClassEntry) -> Vec<ClassEntry>,
    ) -> Vec<ClassEntry> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::from([start.clone()]);
        let mut queue: VecDeque<ClassEntry> = step(start).into();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(step(&next));
            out.push(next);
        }
        out
    }

    /// Every declaration of `method` that overrides, or is overridden by, the declaration that
    /// `method` resolves to. Supertypes include implemented interfaces.
    ///
    /// Empty when the method is declared outside the package.
    pub fn related_method_implementations(&self, method: &MethodEntry) -> BTreeSet<MethodEntry> {
        let mut related = BTreeSet::new();
        let Some(declaring) = self
            .translation
            .resolve_entry_class(&Entry::Method(method.clone()))
        else {
            return related;
        };

        let declares = |class: &ClassEntry| {
            self.translation
                .behavior_exists(&BehaviorEntry::Method(method.with_class(class.clone())))
        };

        let mut queue = vec![declaring.clone()];
        related.insert(method.with_class(declaring));
        while let Some(class) = queue.pop() {
            let upward = self.walk(&class, |c| self.supertypes(c));
            let downward = self.walk(&class, |c| self.subtypes(c));
            for candidate in upward.into_iter().chain(downward) {
                if declares(&candidate) && related.insert(method.with_class(candidate.clone())) {
                    queue.push(candidate);
                }
            }
        }
        related
    }
}
