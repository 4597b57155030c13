use remap_classfile::Signature;
use remap_core::names::{
    validate_argument_name, validate_class_name, validate_field_name, validate_inner_class_name,
    validate_method_name,
};
use remap_core::{
    ArgumentEntry, BehaviorEntry, ClassEntry, Entry, EntryKind, FieldEntry, IllegalName,
    MethodEntry,
};
use remap_index::PackageIndex;

use crate::error::RenameError;
use crate::mappings::{ArgumentMapping, Mappings};

/// The validated mutation surface over [`Mappings`].
///
/// Every `set_*` call validates the name, resolves the symbol against the package, and checks for
/// collisions with both the mappings and the obfuscated names in the package before anything is
/// written. A returned error means nothing changed.
pub struct Renamer<'a> {
    index: &'a PackageIndex,
    mappings: &'a mut Mappings,
}

fn illegal(name: &str) -> impl FnOnce(IllegalName) -> RenameError + '_ {
    move |reason| RenameError::IllegalName {
        name: name.to_owned(),
        reason,
    }
}

fn collision(name: &str, kind: EntryKind, scope: String) -> RenameError {
    RenameError::NameCollision {
        name: name.to_owned(),
        kind,
        scope,
    }
}

impl<'a> Renamer<'a> {
    pub fn new(index: &'a PackageIndex, mappings: &'a mut Mappings) -> Self {
        Self { index, mappings }
    }

    pub fn mappings(&self) -> &Mappings {
        self.mappings
    }

    /// Renames `entry`. Methods are renamed alone; see [`Renamer::set_method_tree_name`] for
    /// override trees.
    pub fn rename(&mut self, entry: &Entry, name: &str) -> Result<(), RenameError> {
        match entry {
            Entry::Class(class) => self.set_class_name(class, name),
            Entry::Field(field) => self.set_field_name(field, name),
            Entry::Method(method) => self.set_method_name(method, name),
            Entry::Argument(arg) => self.set_argument_name(arg, name),
            Entry::Constructor(_) => Err(RenameError::NotRenameable {
                entry: entry.clone(),
            }),
        }
    }

    fn resolve(&self, entry: &Entry) -> Result<ClassEntry, RenameError> {
        self.index
            .translation_index()
            .resolve_entry_class(entry)
            .ok_or_else(|| RenameError::ExternalSymbol {
                entry: entry.clone(),
            })
    }

    // Classes.

    /// Names a class. A top-level class takes a full name (`com/example/Foo`) that must be unique
    /// across the package; an inner class takes a simple name unique within its enclosing class.
    pub fn set_class_name(&mut self, class: &ClassEntry, name: &str) -> Result<(), RenameError> {
        if !self.index.contains_obf_class(class) {
            return Err(RenameError::ExternalSymbol {
                entry: Entry::Class(class.clone()),
            });
        }

        match class.enclosing_class() {
            None => {
                validate_class_name(name).map_err(illegal(name))?;
                let taken_by_obf = name != class.name()
                    && self.index.contains_obf_class(&ClassEntry::new(name));
                if self.mappings.contains_deobf_class(name) || taken_by_obf {
                    return Err(collision(name, EntryKind::Class, "package".to_owned()));
                }
            }
            Some(enclosing) => {
                validate_inner_class_name(name).map_err(illegal(name))?;
                let sibling = enclosing.inner_class(name);
                let taken_by_obf = &sibling != class && self.index.contains_obf_class(&sibling);
                let taken_by_mapping = self
                    .mappings
                    .class_by_obf(enclosing.name())
                    .is_some_and(|mapping| mapping.contains_deobf_inner_class(name));
                if taken_by_mapping || taken_by_obf {
                    return Err(collision(
                        name,
                        EntryKind::Class,
                        format!("class {enclosing}"),
                    ));
                }
            }
        }

        tracing::debug!(target = "remap.mappings", class = %class, name, "renamed class");
        self.mappings
            .set_class_deobf_name(class, Some(name.to_owned()));
        Ok(())
    }

    /// Clears the name of a class. Member mappings stay in place.
    pub fn remove_class_name(&mut self, class: &ClassEntry) {
        if self.mappings.class_by_obf(class.name()).is_none() {
            return;
        }
        self.mappings.set_class_deobf_name(class, None);
        self.mappings.prune(class);
    }

    // Fields.

    pub fn set_field_name(&mut self, field: &FieldEntry, name: &str) -> Result<(), RenameError> {
        validate_field_name(name).map_err(illegal(name))?;
        let declaring = self.resolve(&Entry::Field(field.clone()))?;

        let taken_by_obf =
            name != field.name && self.index.contains_obf_field_named(&declaring, name);
        let taken_by_mapping = self
            .mappings
            .class_by_obf(declaring.name())
            .is_some_and(|mapping| mapping.contains_deobf_field(name));
        if taken_by_mapping || taken_by_obf {
            return Err(collision(
                name,
                EntryKind::Field,
                format!("class {declaring}"),
            ));
        }

        tracing::debug!(target = "remap.mappings", field = %field, name, "renamed field");
        self.mappings
            .get_or_create_class(&declaring)
            .set_field_name(&field.name, &field.ty, name.to_owned());
        Ok(())
    }

    pub fn remove_field_name(&mut self, field: &FieldEntry) {
        let Some(declaring) = self
            .index
            .translation_index()
            .resolve_entry_class(&Entry::Field(field.clone()))
        else {
            return;
        };
        if let Some(mapping) = self.mappings.class_by_obf_mut(declaring.name()) {
            mapping.remove_field_mapping(&field.name, &field.ty);
        }
        self.mappings.prune(&declaring);
    }

    // Methods.

    /// A method name must be free in `class` and across its superclasses and subclasses, where a
    /// method of the same signature would otherwise start or stop overriding it. Declarations of
    /// the same override tree in related classes do not count.
    fn check_method_name(
        &self,
        class: &ClassEntry,
        method: &MethodEntry,
        name: &str,
    ) -> Result<(), RenameError> {
        let taken_in = |relative: &ClassEntry, own: bool| {
            let candidate = MethodEntry::new(relative.clone(), name, method.signature.clone());
            let taken_by_obf = name != method.name
                && self
                    .index
                    .contains_obf_behavior(&BehaviorEntry::Method(candidate));
            let taken_by_mapping = self
                .mappings
                .class_by_obf(relative.name())
                .and_then(|mapping| mapping.method_by_deobf(name, &method.signature))
                .is_some_and(|mapped| own || mapped.obf_name() != method.name);
            taken_by_obf || taken_by_mapping
        };

        let translation = self.index.translation_index();
        let owner = std::iter::once(class.clone()).filter(|class| taken_in(class, true));
        let relatives = translation
            .ancestry(class)
            .into_iter()
            .chain(translation.subclasses_recursively(class))
            .filter(|relative| taken_in(relative, false));
        if let Some(holder) = owner.chain(relatives).next() {
            return Err(collision(
                &format!("{name}{}", method.signature),
                EntryKind::Method,
                format!("class {holder}"),
            ));
        }
        Ok(())
    }

    /// Renames the declaration `method` resolves to, and nothing else.
    pub fn set_method_name(&mut self, method: &MethodEntry, name: &str) -> Result<(), RenameError> {
        validate_method_name(name).map_err(illegal(name))?;
        let declaring = self.resolve(&Entry::Method(method.clone()))?;
        self.check_method_name(&declaring, method, name)?;

        tracing::debug!(target = "remap.mappings", method = %method, name, "renamed method");
        self.mappings.get_or_create_class(&declaring).set_method_name(
            &method.name,
            &method.signature,
            Some(name.to_owned()),
        );
        Ok(())
    }

    /// Renames every declaration in the override tree of `method`. Either every declaration is
    /// renamed or, on the first collision, none is.
    pub fn set_method_tree_name(
        &mut self,
        method: &MethodEntry,
        name: &str,
    ) -> Result<(), RenameError> {
        validate_method_name(name).map_err(illegal(name))?;
        let related = self.index.related_method_implementations(method);
        if related.is_empty() {
            return Err(RenameError::ExternalSymbol {
                entry: Entry::Method(method.clone()),
            });
        }
        for implementation in &related {
            self.check_method_name(&implementation.class, implementation, name)?;
        }

        tracing::debug!(
            target = "remap.mappings",
            method = %method,
            name,
            implementations = related.len(),
            "renamed method tree"
        );
        for implementation in &related {
            self.mappings
                .get_or_create_class(&implementation.class)
                .set_method_name(
                    &implementation.name,
                    &implementation.signature,
                    Some(name.to_owned()),
                );
        }
        Ok(())
    }

    /// Clears the name of a method. Argument names stay.
    pub fn remove_method_name(&mut self, method: &MethodEntry) {
        let Some(declaring) = self
            .index
            .translation_index()
            .resolve_entry_class(&Entry::Method(method.clone()))
        else {
            return;
        };
        if let Some(mapping) = self.mappings.class_by_obf_mut(declaring.name()) {
            mapping.set_method_name(&method.name, &method.signature, None);
        }
        self.mappings.prune(&declaring);
    }

    // Arguments.

    fn argument_key<'e>(
        &self,
        arg: &'e ArgumentEntry,
    ) -> Result<(ClassEntry, &'e str, &'e Signature), RenameError> {
        let entry = Entry::Argument(arg.clone());
        let signature = arg
            .behavior
            .signature()
            .ok_or_else(|| RenameError::NotRenameable {
                entry: entry.clone(),
            })?;
        let declaring = self.resolve(&entry)?;
        Ok((declaring, arg.behavior.name(), signature))
    }

    /// Names a parameter. Constructor parameters may be named; the static initializer has none.
    pub fn set_argument_name(&mut self, arg: &ArgumentEntry, name: &str) -> Result<(), RenameError> {
        validate_argument_name(name).map_err(illegal(name))?;
        let (declaring, behavior_name, signature) = self.argument_key(arg)?;

        let taken = self
            .mappings
            .class_by_obf(declaring.name())
            .and_then(|mapping| mapping.method_by_obf(behavior_name, signature))
            .is_some_and(|method| method.contains_deobf_argument(name));
        if taken {
            return Err(collision(
                name,
                EntryKind::Argument,
                format!("method {}", arg.behavior),
            ));
        }

        tracing::debug!(target = "remap.mappings", argument = %arg, name, "renamed argument");
        let mapping = ArgumentMapping::new(arg.index, Some(arg.name.clone()), name);
        self.mappings.get_or_create_class(&declaring).set_argument_name(
            behavior_name,
            signature,
            arg.index,
            Some(mapping),
        );
        Ok(())
    }

    pub fn remove_argument_name(&mut self, arg: &ArgumentEntry) {
        let Ok((declaring, behavior_name, signature)) = self.argument_key(arg) else {
            return;
        };
        if let Some(mapping) = self.mappings.class_by_obf_mut(declaring.name()) {
            if mapping.method_by_obf(behavior_name, signature).is_some() {
                mapping.set_argument_name(behavior_name, signature, arg.index, None);
            }
        }
        self.mappings.prune(&declaring);
    }
}
