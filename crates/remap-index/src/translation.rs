use std::collections::{BTreeMap, BTreeSet, VecDeque};

use remap_classfile::{ClassStub, MethodStub};
use remap_config::IndexConfig;
use remap_core::{BehaviorEntry, ClassEntry, ConstructorEntry, Entry, FieldEntry, MethodEntry};

/// Inheritance and membership of the classes in one package.
///
/// Superclass edges that touch a library package are never stored, so every ancestry walk ends
/// at the last class that belongs to the package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationIndex {
    superclasses: BTreeMap<ClassEntry, ClassEntry>,
    fields: BTreeMap<ClassEntry, BTreeSet<FieldEntry>>,
    behaviors: BTreeMap<ClassEntry, BTreeSet<BehaviorEntry>>,
}

impl TranslationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stubs<'a>(
        stubs: impl IntoIterator<Item = &'a ClassStub>,
        config: &IndexConfig,
    ) -> Self {
        let mut index = Self::new();
        for stub in stubs {
            index.index_class(stub, config);
        }
        index
    }

    /// Adds one class: its superclass edge (unless either side is a library class) and its
    /// declared members.
    pub fn index_class(&mut self, stub: &ClassStub, config: &IndexConfig) {
        let class = ClassEntry::new(stub.internal_name.as_str());

        if let Some(super_name) = &stub.super_class {
            if config.is_library_class(super_name) || config.is_library_class(class.name()) {
                tracing::trace!(
                    target = "remap.index",
                    class = %class,
                    superclass = %super_name,
                    "skipping library superclass edge"
                );
            } else {
                self.superclasses
                    .insert(class.clone(), ClassEntry::new(super_name.as_str()));
            }
        }

        let fields = self.fields.entry(class.clone()).or_default();
        for field in &stub.fields {
            fields.insert(FieldEntry::new(
                class.clone(),
                field.name.as_str(),
                field.descriptor.clone(),
            ));
        }

        let behaviors = self.behaviors.entry(class.clone()).or_default();
        for method in &stub.methods {
            behaviors.insert(behavior_entry(&class, method));
        }
    }

    pub fn contains_class(&self, class: &ClassEntry) -> bool {
        self.fields.contains_key(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.fields.keys()
    }

    pub fn superclass(&self, class: &ClassEntry) -> Option<&ClassEntry> {
        self.superclasses.get(class)
    }

    /// Ancestors nearest first. Never contains `class` itself; stops at a cycle.
    pub fn ancestry(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let mut ancestry = Vec::new();
        let mut seen = BTreeSet::from([class]);
        let mut current = class;
        while let Some(superclass) = self.superclasses.get(current) {
            if !seen.insert(superclass) {
                break;
            }
            ancestry.push(superclass.clone());
            current = superclass;
        }
        ancestry
    }

    /// Direct subclasses, in name order.
    pub fn subclasses(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        self.superclasses
            .iter()
            .filter(|(_, superclass)| *superclass == class)
            .map(|(subclass, _)| subclass.clone())
            .collect()
    }

    /// Transitive subclasses, breadth first.
    pub fn subclasses_recursively(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::from([class.clone()]);
        let mut queue: VecDeque<ClassEntry> = self.subclasses(class).into();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.subclasses(&next));
            out.push(next);
        }
        out
    }

    pub fn fields(&self, class: &ClassEntry) -> impl Iterator<Item = &FieldEntry> {
        self.fields.get(class).into_iter().flatten()
    }

    pub fn behaviors(&self, class: &ClassEntry) -> impl Iterator<Item = &BehaviorEntry> {
        self.behaviors.get(class).into_iter().flatten()
    }

    pub fn field_exists(&self, field: &FieldEntry) -> bool {
        self.fields
            .get(&field.class)
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn behavior_exists(&self, behavior: &BehaviorEntry) -> bool {
        self.behaviors
            .get(behavior.class())
            .is_some_and(|behaviors| behaviors.contains(behavior))
    }

    pub fn entry_exists(&self, entry: &Entry) -> bool {
        match entry {
            Entry::Class(class) => self.contains_class(class),
            Entry::Field(field) => self.field_exists(field),
            Entry::Method(method) => self.behavior_exists(&BehaviorEntry::Method(method.clone())),
            Entry::Constructor(ctor) => {
                self.behavior_exists(&BehaviorEntry::Constructor(ctor.clone()))
            }
            Entry::Argument(arg) => self.behavior_exists(&arg.behavior),
        }
    }

    /// The class that actually declares `entry`: the literal class, or the nearest ancestor that
    /// declares the same member. `None` when the walk leaves the package.
    ///
    /// Arguments resolve through their behavior; a class entry resolves to itself when indexed.
    pub fn resolve_entry_class(&self, entry: &Entry) -> Option<ClassEntry> {
        let class = entry.class_entry();
        if let Entry::Class(_) = entry {
            return self.contains_class(class).then(|| class.clone());
        }
        if self.entry_exists(entry) {
            return Some(class.clone());
        }
        self.ancestry(class)
            .into_iter()
            .find(|ancestor| self.entry_exists(&entry.with_class(ancestor.clone())))
    }

    /// Renames classes everywhere: keys, superclass targets, member owners and the classes
    /// embedded in field types and signatures.
    pub fn rename_classes(&mut self, renames: &BTreeMap<ClassEntry, ClassEntry>) {
        if renames.is_empty() {
            return;
        }
        let mut replace = |name: &str| {
            renames
                .get(&ClassEntry::new(name))
                .map(|renamed| renamed.name().to_owned())
        };

        self.superclasses = std::mem::take(&mut self.superclasses)
            .into_iter()
            .map(|(class, superclass)| {
                (
                    class.replace_classes(&mut replace),
                    superclass.replace_classes(&mut replace),
                )
            })
            .collect();
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .map(|(class, fields)| {
                (
                    class.replace_classes(&mut replace),
                    fields
                        .iter()
                        .map(|field| field.replace_classes(&mut replace))
                        .collect(),
                )
            })
            .collect();
        self.behaviors = std::mem::take(&mut self.behaviors)
            .into_iter()
            .map(|(class, behaviors)| {
                (
                    class.replace_classes(&mut replace),
                    behaviors
                        .iter()
                        .map(|behavior| behavior.replace_classes(&mut replace))
                        .collect(),
                )
            })
            .collect();
    }

    /// A copy with every entry passed through `translate`.
    ///
    /// `translate` must preserve the kind of the entry; results of another kind are dropped.
    pub fn translated(&self, mut translate: impl FnMut(&Entry) -> Entry) -> TranslationIndex {
        let mut translate_class = |class: &ClassEntry| {
            match translate(&Entry::Class(class.clone())) {
                Entry::Class(translated) => Some(translated),
                _ => None,
            }
        };
        let mut out = TranslationIndex::new();

        for (subclass, superclass) in &self.superclasses {
            let translated = (translate_class(subclass), translate_class(superclass));
            if let (Some(subclass), Some(superclass)) = translated {
                out.superclasses.insert(subclass, superclass);
            }
        }
        let mut classes = BTreeMap::new();
        for owner in self.fields.keys() {
            if let Some(translated) = translate_class(owner) {
                classes.insert(owner.clone(), translated);
            }
        }

        for (owner, fields) in &self.fields {
            let Some(translated_owner) = classes.get(owner) else {
                continue;
            };
            let translated_fields = out.fields.entry(translated_owner.clone()).or_default();
            for field in fields {
                if let Entry::Field(field) = translate(&Entry::Field(field.clone())) {
                    translated_fields.insert(field);
                }
            }
        }
        for (owner, behaviors) in &self.behaviors {
            let Some(translated_owner) = classes.get(owner) else {
                continue;
            };
            let translated_behaviors = out.behaviors.entry(translated_owner.clone()).or_default();
            for behavior in behaviors {
                match translate(&Entry::from(behavior.clone())) {
                    Entry::Method(method) => {
                        translated_behaviors.insert(BehaviorEntry::Method(method));
                    }
                    Entry::Constructor(ctor) => {
                        translated_behaviors.insert(BehaviorEntry::Constructor(ctor));
                    }
                    _ => {}
                }
            }
        }
        out
    }
}

pub(crate) fn behavior_entry(class: &ClassEntry, method: &MethodStub) -> BehaviorEntry {
    if method.is_constructor() {
        BehaviorEntry::Constructor(ConstructorEntry::new(
            class.clone(),
            method.descriptor.clone(),
        ))
    } else if method.is_static_initializer() {
        BehaviorEntry::Constructor(ConstructorEntry::static_initializer(class.clone()))
    } else {
        BehaviorEntry::Method(MethodEntry::new(
            class.clone(),
            method.name.as_str(),
            method.descriptor.clone(),
        ))
    }
}
