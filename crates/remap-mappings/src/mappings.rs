use std::collections::BTreeMap;

use remap_classfile::{Signature, Type, CONSTRUCTOR_NAME};
use remap_core::{BehaviorEntry, ClassEntry, ConstructorEntry, EntryKind, FieldEntry, MethodEntry};

use crate::error::MappingsError;

/// Splits `pkg/a$b$c` into `pkg/a` and `["b", "c"]`.
pub(crate) fn split_class_chain(name: &str) -> (&str, Vec<&str>) {
    let outer = ClassEntry::new(name).outer_class_name().len();
    let inner = name[outer..]
        .split('$')
        .filter(|segment| !segment.is_empty())
        .collect();
    (&name[..outer], inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    obf_name: String,
    obf_type: Type,
    deobf_name: String,
}

impl FieldMapping {
    pub fn new(obf_name: impl Into<String>, obf_type: Type, deobf_name: impl Into<String>) -> Self {
        Self {
            obf_name: obf_name.into(),
            obf_type,
            deobf_name: deobf_name.into(),
        }
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn obf_type(&self) -> &Type {
        &self.obf_type
    }

    pub fn deobf_name(&self) -> &str {
        &self.deobf_name
    }

    /// The obfuscated field this mapping names, declared on `class`.
    pub fn obf_entry(&self, class: &ClassEntry) -> FieldEntry {
        FieldEntry::new(class.clone(), self.obf_name.as_str(), self.obf_type.clone())
    }
}

/// A named parameter. `obf_name` is the name the decompiler produced when the mapping was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMapping {
    index: usize,
    obf_name: Option<String>,
    deobf_name: String,
}

impl ArgumentMapping {
    pub fn new(index: usize, obf_name: Option<String>, deobf_name: impl Into<String>) -> Self {
        Self {
            index,
            obf_name,
            deobf_name: deobf_name.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn obf_name(&self) -> Option<&str> {
        self.obf_name.as_deref()
    }

    pub fn deobf_name(&self) -> &str {
        &self.deobf_name
    }
}

/// A method or constructor mapping. Constructors are keyed as `<init>` and never carry a
/// deobfuscated name, only argument names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMapping {
    obf_name: String,
    obf_signature: Signature,
    deobf_name: Option<String>,
    arguments: BTreeMap<usize, ArgumentMapping>,
}

impl MethodMapping {
    pub fn new(
        obf_name: impl Into<String>,
        obf_signature: Signature,
        deobf_name: Option<String>,
    ) -> Self {
        Self {
            obf_name: obf_name.into(),
            obf_signature,
            deobf_name,
            arguments: BTreeMap::new(),
        }
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn obf_signature(&self) -> &Signature {
        &self.obf_signature
    }

    pub fn deobf_name(&self) -> Option<&str> {
        self.deobf_name.as_deref()
    }

    pub fn is_constructor(&self) -> bool {
        self.obf_name == CONSTRUCTOR_NAME
    }

    /// The obfuscated behavior this mapping names, declared on `class`.
    pub fn obf_entry(&self, class: &ClassEntry) -> BehaviorEntry {
        if self.is_constructor() {
            BehaviorEntry::Constructor(ConstructorEntry::new(
                class.clone(),
                self.obf_signature.clone(),
            ))
        } else {
            BehaviorEntry::Method(MethodEntry::new(
                class.clone(),
                self.obf_name.as_str(),
                self.obf_signature.clone(),
            ))
        }
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentMapping> {
        self.arguments.values()
    }

    pub fn argument(&self, index: usize) -> Option<&ArgumentMapping> {
        self.arguments.get(&index)
    }

    pub fn contains_deobf_argument(&self, name: &str) -> bool {
        self.arguments.values().any(|arg| arg.deobf_name == name)
    }

    pub fn add_argument(&mut self, argument: ArgumentMapping) -> Result<(), MappingsError> {
        let scope = || format!("method {}{}", self.obf_name, self.obf_signature);
        if self.arguments.contains_key(&argument.index) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Argument,
                name: argument.index.to_string(),
                scope: scope(),
            });
        }
        if self.contains_deobf_argument(&argument.deobf_name) {
            return Err(MappingsError::DuplicateDeobfName {
                kind: EntryKind::Argument,
                name: argument.deobf_name,
                scope: scope(),
            });
        }
        self.arguments.insert(argument.index, argument);
        Ok(())
    }

    /// No name and no arguments.
    pub fn is_empty(&self) -> bool {
        self.deobf_name.is_none() && self.arguments.is_empty()
    }

    pub(crate) fn set_argument(&mut self, index: usize, argument: Option<ArgumentMapping>) {
        match argument {
            Some(argument) => {
                self.arguments.insert(index, argument);
            }
            None => {
                self.arguments.remove(&index);
            }
        }
    }

    fn replace_classes(&mut self, replace: &mut impl FnMut(&str) -> Option<String>) {
        self.obf_signature = self.obf_signature.replace_classes(replace);
    }
}

type FieldKey = (String, Type);
type MethodKey = (String, Signature);

/// Mappings for one class and everything nested in it.
///
/// A top-level mapping is keyed by its full obfuscated name and carries a full deobfuscated
/// name. An inner mapping is keyed by its simple obfuscated name inside its enclosing mapping and
/// carries a simple deobfuscated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    obf_full_name: String,
    obf_simple_name: String,
    deobf_name: Option<String>,
    inner_classes_by_obf: BTreeMap<String, ClassMapping>,
    inner_classes_by_deobf: BTreeMap<String, String>,
    fields_by_obf: BTreeMap<FieldKey, FieldMapping>,
    fields_by_deobf: BTreeMap<String, FieldKey>,
    methods_by_obf: BTreeMap<MethodKey, MethodMapping>,
    methods_by_deobf: BTreeMap<MethodKey, String>,
}

impl ClassMapping {
    /// A top-level class mapping.
    pub fn new(obf_name: impl Into<String>, deobf_name: Option<String>) -> Self {
        let obf_name = obf_name.into();
        Self::with_names(obf_name.clone(), obf_name, deobf_name)
    }

    /// An inner class mapping nested in the class named `outer_obf_name`.
    pub fn new_inner(
        outer_obf_name: &str,
        obf_simple_name: impl Into<String>,
        deobf_name: Option<String>,
    ) -> Self {
        let obf_simple_name = obf_simple_name.into();
        Self::with_names(
            format!("{outer_obf_name}${obf_simple_name}"),
            obf_simple_name,
            deobf_name,
        )
    }

    fn with_names(obf_full_name: String, obf_simple_name: String, deobf_name: Option<String>) -> Self {
        Self {
            obf_full_name,
            obf_simple_name,
            deobf_name,
            inner_classes_by_obf: BTreeMap::new(),
            inner_classes_by_deobf: BTreeMap::new(),
            fields_by_obf: BTreeMap::new(),
            fields_by_deobf: BTreeMap::new(),
            methods_by_obf: BTreeMap::new(),
            methods_by_deobf: BTreeMap::new(),
        }
    }

    pub fn obf_full_name(&self) -> &str {
        &self.obf_full_name
    }

    /// The key of this mapping in its parent: the simple name of an inner class, the full name of
    /// a top-level class.
    pub fn obf_simple_name(&self) -> &str {
        &self.obf_simple_name
    }

    pub fn obf_entry(&self) -> ClassEntry {
        ClassEntry::new(self.obf_full_name.as_str())
    }

    pub fn deobf_name(&self) -> Option<&str> {
        self.deobf_name.as_deref()
    }

    /// Nothing mapped here or below.
    pub fn is_empty(&self) -> bool {
        self.deobf_name.is_none()
            && self.fields_by_obf.is_empty()
            && self.methods_by_obf.is_empty()
            && self.inner_classes_by_obf.is_empty()
    }

    fn scope(&self) -> String {
        format!("class {}", self.obf_full_name)
    }

    // Inner classes.

    pub fn inner_classes(&self) -> impl Iterator<Item = &ClassMapping> {
        self.inner_classes_by_obf.values()
    }

    pub fn inner_class_by_obf(&self, obf_simple_name: &str) -> Option<&ClassMapping> {
        self.inner_classes_by_obf.get(obf_simple_name)
    }

    pub fn inner_class_by_deobf(&self, deobf_simple_name: &str) -> Option<&ClassMapping> {
        self.inner_classes_by_deobf
            .get(deobf_simple_name)
            .and_then(|obf| self.inner_classes_by_obf.get(obf))
    }

    pub fn contains_deobf_inner_class(&self, deobf_simple_name: &str) -> bool {
        self.inner_classes_by_deobf.contains_key(deobf_simple_name)
    }

    pub fn add_inner_class(&mut self, inner: ClassMapping) -> Result<(), MappingsError> {
        if self.inner_classes_by_obf.contains_key(&inner.obf_simple_name) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Class,
                name: inner.obf_simple_name,
                scope: self.scope(),
            });
        }
        if let Some(deobf) = &inner.deobf_name {
            if self.inner_classes_by_deobf.contains_key(deobf) {
                return Err(MappingsError::DuplicateDeobfName {
                    kind: EntryKind::Class,
                    name: deobf.clone(),
                    scope: self.scope(),
                });
            }
            self.inner_classes_by_deobf
                .insert(deobf.clone(), inner.obf_simple_name.clone());
        }
        self.inner_classes_by_obf
            .insert(inner.obf_simple_name.clone(), inner);
        Ok(())
    }

    pub(crate) fn inner_class_mut(&mut self, obf_simple_name: &str) -> Option<&mut ClassMapping> {
        self.inner_classes_by_obf.get_mut(obf_simple_name)
    }

    pub(crate) fn get_or_create_inner(&mut self, obf_simple_name: &str) -> &mut ClassMapping {
        let outer = self.obf_full_name.clone();
        self.inner_classes_by_obf
            .entry(obf_simple_name.to_owned())
            .or_insert_with(|| ClassMapping::new_inner(&outer, obf_simple_name, None))
    }

    pub(crate) fn set_inner_class_name(&mut self, obf_simple_name: &str, deobf: Option<String>) {
        let inner = self.get_or_create_inner(obf_simple_name);
        let previous = std::mem::replace(&mut inner.deobf_name, deobf.clone());
        if let Some(previous) = previous {
            self.inner_classes_by_deobf.remove(&previous);
        }
        if let Some(deobf) = deobf {
            self.inner_classes_by_deobf
                .insert(deobf, obf_simple_name.to_owned());
        }
    }

    pub(crate) fn remove_inner_class(&mut self, obf_simple_name: &str) -> Option<ClassMapping> {
        let removed = self.inner_classes_by_obf.remove(obf_simple_name)?;
        if let Some(deobf) = &removed.deobf_name {
            self.inner_classes_by_deobf.remove(deobf);
        }
        Some(removed)
    }

    // Fields.

    pub fn fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields_by_obf.values()
    }

    pub fn field_by_obf(&self, obf_name: &str, obf_type: &Type) -> Option<&FieldMapping> {
        self.fields_by_obf
            .get(&(obf_name.to_owned(), obf_type.clone()))
    }

    pub fn field_by_deobf(&self, deobf_name: &str) -> Option<&FieldMapping> {
        self.fields_by_deobf
            .get(deobf_name)
            .and_then(|key| self.fields_by_obf.get(key))
    }

    pub fn contains_deobf_field(&self, deobf_name: &str) -> bool {
        self.fields_by_deobf.contains_key(deobf_name)
    }

    pub fn add_field_mapping(&mut self, field: FieldMapping) -> Result<(), MappingsError> {
        let key = (field.obf_name.clone(), field.obf_type.clone());
        if self.fields_by_obf.contains_key(&key) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Field,
                name: field.obf_name,
                scope: self.scope(),
            });
        }
        if self.fields_by_deobf.contains_key(&field.deobf_name) {
            return Err(MappingsError::DuplicateDeobfName {
                kind: EntryKind::Field,
                name: field.deobf_name,
                scope: self.scope(),
            });
        }
        self.fields_by_deobf.insert(field.deobf_name.clone(), key.clone());
        self.fields_by_obf.insert(key, field);
        Ok(())
    }

    /// Moves a field mapping to another obfuscated name, keeping its type and deobfuscated name.
    pub fn set_field_obf_name(
        &mut self,
        obf_name: &str,
        obf_type: &Type,
        new_obf_name: &str,
    ) -> Result<(), MappingsError> {
        if obf_name == new_obf_name {
            return Ok(());
        }
        let key = (new_obf_name.to_owned(), obf_type.clone());
        if self.fields_by_obf.contains_key(&key) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Field,
                name: new_obf_name.to_owned(),
                scope: self.scope(),
            });
        }
        if let Some(mut field) = self.remove_field_mapping(obf_name, obf_type) {
            field.obf_name = new_obf_name.to_owned();
            self.fields_by_deobf.insert(field.deobf_name.clone(), key.clone());
            self.fields_by_obf.insert(key, field);
        }
        Ok(())
    }

    pub(crate) fn set_field_name(&mut self, obf_name: &str, obf_type: &Type, deobf: String) {
        self.remove_field_mapping(obf_name, obf_type);
        let key = (obf_name.to_owned(), obf_type.clone());
        self.fields_by_deobf.insert(deobf.clone(), key.clone());
        self.fields_by_obf
            .insert(key, FieldMapping::new(obf_name, obf_type.clone(), deobf));
    }

    pub(crate) fn remove_field_mapping(
        &mut self,
        obf_name: &str,
        obf_type: &Type,
    ) -> Option<FieldMapping> {
        let removed = self
            .fields_by_obf
            .remove(&(obf_name.to_owned(), obf_type.clone()))?;
        self.fields_by_deobf.remove(&removed.deobf_name);
        Some(removed)
    }

    // Methods.

    pub fn methods(&self) -> impl Iterator<Item = &MethodMapping> {
        self.methods_by_obf.values()
    }

    pub fn method_by_obf(&self, obf_name: &str, obf_signature: &Signature) -> Option<&MethodMapping> {
        self.methods_by_obf
            .get(&(obf_name.to_owned(), obf_signature.clone()))
    }

    /// Deobfuscated names are unique per obfuscated signature, so overloads may share a name.
    pub fn method_by_deobf(
        &self,
        deobf_name: &str,
        obf_signature: &Signature,
    ) -> Option<&MethodMapping> {
        let obf_name = self
            .methods_by_deobf
            .get(&(deobf_name.to_owned(), obf_signature.clone()))?;
        self.method_by_obf(obf_name, obf_signature)
    }

    pub fn contains_deobf_method(&self, deobf_name: &str, obf_signature: &Signature) -> bool {
        self.methods_by_deobf
            .contains_key(&(deobf_name.to_owned(), obf_signature.clone()))
    }

    pub fn add_method_mapping(&mut self, method: MethodMapping) -> Result<(), MappingsError> {
        let key = (method.obf_name.clone(), method.obf_signature.clone());
        if self.methods_by_obf.contains_key(&key) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Method,
                name: format!("{}{}", method.obf_name, method.obf_signature),
                scope: self.scope(),
            });
        }
        if let Some(deobf) = &method.deobf_name {
            let deobf_key = (deobf.clone(), method.obf_signature.clone());
            if self.methods_by_deobf.contains_key(&deobf_key) {
                return Err(MappingsError::DuplicateDeobfName {
                    kind: EntryKind::Method,
                    name: format!("{deobf}{}", method.obf_signature),
                    scope: self.scope(),
                });
            }
            self.methods_by_deobf
                .insert(deobf_key, method.obf_name.clone());
        }
        self.methods_by_obf.insert(key, method);
        Ok(())
    }

    fn get_or_create_method(&mut self, obf_name: &str, obf_signature: &Signature) -> &mut MethodMapping {
        self.methods_by_obf
            .entry((obf_name.to_owned(), obf_signature.clone()))
            .or_insert_with(|| MethodMapping::new(obf_name, obf_signature.clone(), None))
    }

    fn prune_method(&mut self, obf_name: &str, obf_signature: &Signature) {
        let key = (obf_name.to_owned(), obf_signature.clone());
        if self.methods_by_obf.get(&key).is_some_and(MethodMapping::is_empty) {
            self.methods_by_obf.remove(&key);
        }
    }

    pub(crate) fn set_method_name(
        &mut self,
        obf_name: &str,
        obf_signature: &Signature,
        deobf: Option<String>,
    ) {
        let method = self.get_or_create_method(obf_name, obf_signature);
        let previous = std::mem::replace(&mut method.deobf_name, deobf.clone());
        if let Some(previous) = previous {
            self.methods_by_deobf
                .remove(&(previous, obf_signature.clone()));
        }
        if let Some(deobf) = deobf {
            self.methods_by_deobf
                .insert((deobf, obf_signature.clone()), obf_name.to_owned());
        }
        self.prune_method(obf_name, obf_signature);
    }

    pub(crate) fn remove_method_mapping(
        &mut self,
        obf_name: &str,
        obf_signature: &Signature,
    ) -> Option<MethodMapping> {
        let removed = self
            .methods_by_obf
            .remove(&(obf_name.to_owned(), obf_signature.clone()))?;
        if let Some(deobf) = &removed.deobf_name {
            self.methods_by_deobf
                .remove(&(deobf.clone(), obf_signature.clone()));
        }
        Some(removed)
    }

    /// Moves a method mapping, arguments included, to another obfuscated name.
    pub fn set_method_obf_name(
        &mut self,
        obf_name: &str,
        obf_signature: &Signature,
        new_obf_name: &str,
    ) -> Result<(), MappingsError> {
        if obf_name == new_obf_name {
            return Ok(());
        }
        let key = (new_obf_name.to_owned(), obf_signature.clone());
        if self.methods_by_obf.contains_key(&key) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Method,
                name: format!("{new_obf_name}{obf_signature}"),
                scope: self.scope(),
            });
        }
        if let Some(mut method) = self.remove_method_mapping(obf_name, obf_signature) {
            method.obf_name = new_obf_name.to_owned();
            if let Some(deobf) = &method.deobf_name {
                self.methods_by_deobf
                    .insert((deobf.clone(), obf_signature.clone()), new_obf_name.to_owned());
            }
            self.methods_by_obf.insert(key, method);
        }
        Ok(())
    }

    pub(crate) fn set_argument_name(
        &mut self,
        obf_name: &str,
        obf_signature: &Signature,
        index: usize,
        argument: Option<ArgumentMapping>,
    ) {
        self.get_or_create_method(obf_name, obf_signature)
            .set_argument(index, argument);
        self.prune_method(obf_name, obf_signature);
    }

    // Bulk edits.

    pub(crate) fn set_deobf_name_unchecked(&mut self, deobf: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.deobf_name, deobf)
    }

    /// This mapping's name and members, placed on `class`. Every class embedded in a member type
    /// or signature goes through `replace`. Inner class mappings are left behind.
    pub fn migrated_to(
        &self,
        class: &ClassEntry,
        replace: &mut impl FnMut(&str) -> Option<String>,
    ) -> ClassMapping {
        let deobf = self.deobf_name.as_deref().map(|name| {
            if class.is_inner_class() {
                let entry = ClassEntry::new(name);
                entry
                    .inner_class_name()
                    .unwrap_or(entry.simple_name())
                    .to_owned()
            } else {
                name.to_owned()
            }
        });
        let mut migrated = match (class.enclosing_class(), class.inner_class_name()) {
            (Some(enclosing), Some(simple)) => ClassMapping::new_inner(enclosing.name(), simple, deobf),
            _ => ClassMapping::new(class.name(), deobf),
        };
        migrated.fields_by_obf = self.fields_by_obf.clone();
        migrated.methods_by_obf = self.methods_by_obf.clone();
        migrated.replace_classes(replace);
        migrated
    }

    /// Moves this mapping (and everything below it) to a new obfuscated name.
    pub(crate) fn set_obf_names(&mut self, obf_full_name: String, obf_simple_name: String) {
        self.obf_full_name = obf_full_name;
        self.obf_simple_name = obf_simple_name;
        let outer = self.obf_full_name.clone();
        for inner in self.inner_classes_by_obf.values_mut() {
            let full = format!("{outer}${}", inner.obf_simple_name);
            let simple = inner.obf_simple_name.clone();
            inner.set_obf_names(full, simple);
        }
    }

    /// Rewrites the classes embedded in member types and signatures, here and below.
    pub(crate) fn replace_classes(&mut self, replace: &mut impl FnMut(&str) -> Option<String>) {
        let fields = std::mem::take(&mut self.fields_by_obf);
        self.fields_by_deobf.clear();
        for (_, mut field) in fields {
            field.obf_type = field.obf_type.replace_classes(replace);
            let key = (field.obf_name.clone(), field.obf_type.clone());
            self.fields_by_deobf.insert(field.deobf_name.clone(), key.clone());
            self.fields_by_obf.insert(key, field);
        }

        let methods = std::mem::take(&mut self.methods_by_obf);
        self.methods_by_deobf.clear();
        for (_, mut method) in methods {
            method.replace_classes(replace);
            let key = (method.obf_name.clone(), method.obf_signature.clone());
            if let Some(deobf) = &method.deobf_name {
                self.methods_by_deobf.insert(
                    (deobf.clone(), method.obf_signature.clone()),
                    method.obf_name.clone(),
                );
            }
            self.methods_by_obf.insert(key, method);
        }

        for inner in self.inner_classes_by_obf.values_mut() {
            inner.replace_classes(replace);
        }
    }
}

/// The bidirectional name store.
///
/// The forward maps (by obfuscated name) are authoritative; the reverse lookups are updated by
/// the same call that touches the forward map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mappings {
    classes_by_obf: BTreeMap<String, ClassMapping>,
    classes_by_deobf: BTreeMap<String, String>,
}

impl Mappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.classes_by_obf.is_empty()
    }

    /// Top-level class mappings, by obfuscated name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassMapping> {
        self.classes_by_obf.values()
    }

    /// Every class mapping, each outer class before its inner classes.
    pub fn all_classes(&self) -> Vec<&ClassMapping> {
        let mut out = Vec::new();
        let mut stack: Vec<&ClassMapping> = self.classes_by_obf.values().rev().collect();
        while let Some(mapping) = stack.pop() {
            out.push(mapping);
            let inner: Vec<&ClassMapping> = mapping.inner_classes().collect();
            stack.extend(inner.into_iter().rev());
        }
        out
    }

    pub fn add_class_mapping(&mut self, mapping: ClassMapping) -> Result<(), MappingsError> {
        if self.classes_by_obf.contains_key(&mapping.obf_full_name) {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Class,
                name: mapping.obf_full_name,
                scope: "package".to_owned(),
            });
        }
        if let Some(deobf) = &mapping.deobf_name {
            if self.classes_by_deobf.contains_key(deobf) {
                return Err(MappingsError::DuplicateDeobfName {
                    kind: EntryKind::Class,
                    name: deobf.clone(),
                    scope: "package".to_owned(),
                });
            }
            self.classes_by_deobf
                .insert(deobf.clone(), mapping.obf_full_name.clone());
        }
        self.classes_by_obf
            .insert(mapping.obf_full_name.clone(), mapping);
        Ok(())
    }

    /// Adds `mapping` where its obfuscated name places it, creating unnamed enclosing mappings
    /// for an inner class when they are missing.
    pub fn insert_class_mapping(&mut self, mapping: ClassMapping) -> Result<(), MappingsError> {
        match mapping.obf_entry().enclosing_class() {
            Some(enclosing) => self.get_or_create_class(&enclosing).add_inner_class(mapping),
            None => self.add_class_mapping(mapping),
        }
    }

    /// Looks up a class by its full obfuscated name, following inner-class chains.
    pub fn class_by_obf(&self, obf_name: &str) -> Option<&ClassMapping> {
        let (outer, inner) = split_class_chain(obf_name);
        let mut current = self.classes_by_obf.get(outer)?;
        for segment in inner {
            current = current.inner_class_by_obf(segment)?;
        }
        Some(current)
    }

    /// Looks up a class by its full deobfuscated name. Unnamed links of an inner-class chain are
    /// matched by their obfuscated name.
    pub fn class_by_deobf(&self, deobf_name: &str) -> Option<&ClassMapping> {
        let (outer, inner) = split_class_chain(deobf_name);
        let mut current = match self.classes_by_deobf.get(outer) {
            Some(obf) => self.classes_by_obf.get(obf)?,
            None => self
                .classes_by_obf
                .get(outer)
                .filter(|mapping| mapping.deobf_name.is_none())?,
        };
        for segment in inner {
            current = match current.inner_class_by_deobf(segment) {
                Some(mapping) => mapping,
                None => current
                    .inner_class_by_obf(segment)
                    .filter(|mapping| mapping.deobf_name.is_none())?,
            };
        }
        Some(current)
    }

    /// Whether a top-level class already uses `deobf_name`.
    pub fn contains_deobf_class(&self, deobf_name: &str) -> bool {
        self.classes_by_deobf.contains_key(deobf_name)
    }

    /// Removes a class mapping and everything nested in it.
    pub fn remove_class_mapping(&mut self, class: &ClassEntry) -> Option<ClassMapping> {
        match class.enclosing_class() {
            Some(enclosing) => {
                let simple = class.inner_class_name()?.to_owned();
                self.class_by_obf_mut(enclosing.name())?
                    .remove_inner_class(&simple)
            }
            None => {
                let removed = self.classes_by_obf.remove(class.name())?;
                if let Some(deobf) = &removed.deobf_name {
                    self.classes_by_deobf.remove(deobf);
                }
                Some(removed)
            }
        }
    }

    /// Re-keys the mapping of `old` under `new` and rewrites every type and signature in the store
    /// that mentions `old` or one of its inner classes.
    pub fn rename_obf_class(
        &mut self,
        old: &ClassEntry,
        new: &ClassEntry,
    ) -> Result<(), MappingsError> {
        if old == new {
            return Ok(());
        }
        if self.class_by_obf(new.name()).is_some() {
            return Err(MappingsError::DuplicateObfName {
                kind: EntryKind::Class,
                name: new.name().to_owned(),
                scope: "package".to_owned(),
            });
        }
        // The deobfuscated name moves along; it must be free in the new scope.
        if let Some(deobf) = self.class_by_obf(old.name()).and_then(ClassMapping::deobf_name) {
            let (holder, scope) = match new.enclosing_class() {
                Some(enclosing) => match self.class_by_obf(enclosing.name()) {
                    Some(parent) => (
                        parent.inner_class_by_deobf(deobf).map(ClassMapping::obf_entry),
                        parent.scope(),
                    ),
                    None => (None, String::new()),
                },
                None => (
                    self.classes_by_deobf
                        .get(deobf)
                        .map(|obf| ClassEntry::new(obf.as_str())),
                    "package".to_owned(),
                ),
            };
            if holder.is_some_and(|holder| holder != *old) {
                return Err(MappingsError::DuplicateDeobfName {
                    kind: EntryKind::Class,
                    name: deobf.to_owned(),
                    scope,
                });
            }
        }

        if let Some(mut mapping) = self.remove_class_mapping(old) {
            let deobf = mapping.set_deobf_name_unchecked(None);
            match new.enclosing_class() {
                Some(enclosing) => {
                    let simple = new.inner_class_name().unwrap_or(new.name()).to_owned();
                    mapping.set_obf_names(new.name().to_owned(), simple.clone());
                    let parent = self.get_or_create_class(&enclosing);
                    parent.add_inner_class(mapping)?;
                    parent.set_inner_class_name(&simple, deobf);
                }
                None => {
                    mapping.set_obf_names(new.name().to_owned(), new.name().to_owned());
                    self.add_class_mapping(mapping)?;
                    self.set_class_deobf_name(new, deobf);
                }
            }
        }

        let old_name = old.name().to_owned();
        let new_name = new.name().to_owned();
        let mut replace = |name: &str| {
            if name == old_name {
                Some(new_name.clone())
            } else {
                name.strip_prefix(old_name.as_str())
                    .filter(|rest| rest.starts_with('$'))
                    .map(|rest| format!("{new_name}{rest}"))
            }
        };
        for mapping in self.classes_by_obf.values_mut() {
            mapping.replace_classes(&mut replace);
        }
        Ok(())
    }

    pub fn class_by_obf_mut(&mut self, obf_name: &str) -> Option<&mut ClassMapping> {
        let (outer, inner) = split_class_chain(obf_name);
        let mut current = self.classes_by_obf.get_mut(outer)?;
        for segment in inner {
            current = current.inner_class_mut(segment)?;
        }
        Some(current)
    }

    /// The mapping for `class`, creating it and any missing enclosing mappings.
    pub(crate) fn get_or_create_class(&mut self, class: &ClassEntry) -> &mut ClassMapping {
        let (outer, inner) = split_class_chain(class.name());
        let mut current = self
            .classes_by_obf
            .entry(outer.to_owned())
            .or_insert_with(|| ClassMapping::new(outer, None));
        for segment in inner {
            current = current.get_or_create_inner(segment);
        }
        current
    }

    /// Sets or clears the deobfuscated name of a class, keeping the reverse lookups current.
    pub(crate) fn set_class_deobf_name(&mut self, class: &ClassEntry, deobf: Option<String>) {
        match class.enclosing_class() {
            Some(enclosing) => {
                let simple = class.inner_class_name().unwrap_or(class.name()).to_owned();
                self.get_or_create_class(&enclosing)
                    .set_inner_class_name(&simple, deobf);
            }
            None => {
                let previous = self
                    .get_or_create_class(class)
                    .set_deobf_name_unchecked(deobf.clone());
                if let Some(previous) = previous {
                    self.classes_by_deobf.remove(&previous);
                }
                if let Some(deobf) = deobf {
                    self.classes_by_deobf.insert(deobf, class.name().to_owned());
                }
            }
        }
    }

    /// Drops empty mappings along the chain of `class`, innermost first.
    pub(crate) fn prune(&mut self, class: &ClassEntry) {
        for link in class.class_chain().iter().rev() {
            if !self.class_by_obf(link.name()).is_some_and(ClassMapping::is_empty) {
                break;
            }
            self.remove_class_mapping(link);
        }
    }
}
