use remap_classfile::{Signature, Type};
use remap_core::{
    ArgumentEntry, BehaviorEntry, ClassEntry, ConstructorEntry, Entry, EntryReference, FieldEntry,
    MethodEntry,
};
use remap_index::TranslationIndex;

use crate::mappings::{split_class_chain, ClassMapping, Mappings, MethodMapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationDirection {
    /// Obfuscated names to human-readable names.
    Deobfuscating,
    /// Human-readable names back to obfuscated names.
    Obfuscating,
}

impl TranslationDirection {
    pub fn inverse(self) -> Self {
        match self {
            TranslationDirection::Deobfuscating => TranslationDirection::Obfuscating,
            TranslationDirection::Obfuscating => TranslationDirection::Deobfuscating,
        }
    }
}

impl Mappings {
    pub fn translator<'a>(
        &'a self,
        index: &'a TranslationIndex,
        direction: TranslationDirection,
    ) -> Translator<'a> {
        Translator::new(index, self, direction)
    }
}

/// Rewrites entries, types and signatures from one namespace to the other.
///
/// Anything without a mapping passes through unchanged. The index always describes the
/// obfuscated package.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    index: &'a TranslationIndex,
    mappings: &'a Mappings,
    direction: TranslationDirection,
}

impl<'a> Translator<'a> {
    pub fn new(
        index: &'a TranslationIndex,
        mappings: &'a Mappings,
        direction: TranslationDirection,
    ) -> Self {
        Self {
            index,
            mappings,
            direction,
        }
    }

    pub fn direction(&self) -> TranslationDirection {
        self.direction
    }

    // Classes and descriptors.

    pub fn translate_class_name(&self, name: &str) -> String {
        match self.direction {
            TranslationDirection::Deobfuscating => self.deobfuscate_class_name(name),
            TranslationDirection::Obfuscating => self.obfuscate_class_name(name),
        }
    }

    fn deobfuscate_class_name(&self, name: &str) -> String {
        let (outer, inner) = split_class_chain(name);
        let Some(mut mapping) = self.mappings.class_by_obf(outer) else {
            return name.to_owned();
        };
        let mut out = mapping.deobf_name().unwrap_or(outer).to_owned();
        let mut segments = inner.into_iter();
        for segment in segments.by_ref() {
            match mapping.inner_class_by_obf(segment) {
                Some(inner) => {
                    out.push('$');
                    out.push_str(inner.deobf_name().unwrap_or(segment));
                    mapping = inner;
                }
                None => {
                    out.push('$');
                    out.push_str(segment);
                    break;
                }
            }
        }
        for segment in segments {
            out.push('$');
            out.push_str(segment);
        }
        out
    }

    fn obfuscate_class_name(&self, name: &str) -> String {
        let (outer, inner) = split_class_chain(name);
        let Some(mut mapping) = self.mappings.class_by_deobf(outer) else {
            return name.to_owned();
        };
        let mut out = mapping.obf_full_name().to_owned();
        let mut segments = inner.into_iter();
        for segment in segments.by_ref() {
            let next = mapping.inner_class_by_deobf(segment).or_else(|| {
                mapping
                    .inner_class_by_obf(segment)
                    .filter(|inner| inner.deobf_name().is_none())
            });
            match next {
                Some(inner) => {
                    out = inner.obf_full_name().to_owned();
                    mapping = inner;
                }
                None => {
                    out.push('$');
                    out.push_str(segment);
                    break;
                }
            }
        }
        for segment in segments {
            out.push('$');
            out.push_str(segment);
        }
        out
    }

    pub fn translate_class(&self, class: &ClassEntry) -> ClassEntry {
        ClassEntry::new(self.translate_class_name(class.name()))
    }

    pub fn translate_type(&self, ty: &Type) -> Type {
        ty.replace_classes(&mut |name| Some(self.translate_class_name(name)))
    }

    /// An absent signature (the static initializer's) stays absent.
    pub fn translate_signature(&self, signature: Option<&Signature>) -> Option<Signature> {
        signature.map(|signature| self.signature(signature))
    }

    fn signature(&self, signature: &Signature) -> Signature {
        signature.replace_classes(&mut |name| Some(self.translate_class_name(name)))
    }

    /// Obfuscated classes to search for a member mapping, given the obfuscated class named in a
    /// reference. Deobfuscating uses the declaring class when the member resolves; obfuscating
    /// cannot test existence by name, so it searches the whole ancestry.
    fn obf_search_path(&self, obf_class: &ClassEntry, obf_entry: Option<&Entry>) -> Vec<ClassEntry> {
        if let Some(entry) = obf_entry {
            return vec![self
                .index
                .resolve_entry_class(entry)
                .unwrap_or_else(|| obf_class.clone())];
        }
        let mut path = vec![obf_class.clone()];
        path.extend(self.index.ancestry(obf_class));
        path
    }

    fn class_mapping(&self, obf_class: &ClassEntry) -> Option<&'a ClassMapping> {
        self.mappings.class_by_obf(obf_class.name())
    }

    // Members.

    pub fn translate_field(&self, field: &FieldEntry) -> FieldEntry {
        let class = self.translate_class(&field.class);
        let ty = self.translate_type(&field.ty);
        let name = match self.direction {
            TranslationDirection::Deobfuscating => self
                .obf_search_path(&field.class, Some(&Entry::Field(field.clone())))
                .iter()
                .filter_map(|owner| self.class_mapping(owner))
                .find_map(|mapping| mapping.field_by_obf(&field.name, &field.ty))
                .map(|mapping| mapping.deobf_name().to_owned()),
            TranslationDirection::Obfuscating => self
                .obf_search_path(&class, None)
                .iter()
                .filter_map(|owner| self.class_mapping(owner))
                .filter_map(|mapping| mapping.field_by_deobf(&field.name))
                .find(|mapping| mapping.obf_type() == &ty)
                .map(|mapping| mapping.obf_name().to_owned()),
        };
        FieldEntry::new(class, name.unwrap_or_else(|| field.name.clone()), ty)
    }

    /// The mapping of the behavior an entry refers to, with the behavior in obfuscated form.
    fn behavior_mapping(
        &self,
        behavior: &BehaviorEntry,
        obf_class: &ClassEntry,
        obf_signature: &Signature,
    ) -> Option<&'a MethodMapping> {
        match self.direction {
            TranslationDirection::Deobfuscating => self
                .obf_search_path(obf_class, Some(&Entry::from(behavior.clone())))
                .iter()
                .filter_map(|owner| self.class_mapping(owner))
                .find_map(|mapping| mapping.method_by_obf(behavior.name(), obf_signature)),
            TranslationDirection::Obfuscating => match behavior {
                BehaviorEntry::Method(method) => {
                    let path = self.obf_search_path(obf_class, None);
                    let mut found = None;
                    for mapping in path.iter().filter_map(|owner| self.class_mapping(owner)) {
                        let by_deobf = mapping.method_by_deobf(&method.name, obf_signature);
                        // An unnamed method keeps its obfuscated name in both namespaces.
                        let unnamed = mapping
                            .method_by_obf(&method.name, obf_signature)
                            .filter(|method| method.deobf_name().is_none());
                        if let Some(hit) = by_deobf.or(unnamed) {
                            found = Some(hit);
                            break;
                        }
                    }
                    found
                }
                // Constructors are never inherited.
                BehaviorEntry::Constructor(ctor) => self
                    .class_mapping(obf_class)
                    .and_then(|mapping| mapping.method_by_obf(ctor.name(), obf_signature)),
            },
        }
    }

    pub fn translate_method(&self, method: &MethodEntry) -> MethodEntry {
        let class = self.translate_class(&method.class);
        let signature = self.signature(&method.signature);
        let (obf_class, obf_signature) = match self.direction {
            TranslationDirection::Deobfuscating => (&method.class, &method.signature),
            TranslationDirection::Obfuscating => (&class, &signature),
        };
        let behavior = BehaviorEntry::Method(method.clone());
        let name = self
            .behavior_mapping(&behavior, obf_class, obf_signature)
            .and_then(|mapping| match self.direction {
                TranslationDirection::Deobfuscating => mapping.deobf_name(),
                TranslationDirection::Obfuscating => Some(mapping.obf_name()),
            })
            .map(str::to_owned);
        MethodEntry::new(class, name.unwrap_or_else(|| method.name.clone()), signature)
    }

    pub fn translate_constructor(&self, ctor: &ConstructorEntry) -> ConstructorEntry {
        ConstructorEntry {
            class: self.translate_class(&ctor.class),
            signature: self.translate_signature(ctor.signature.as_ref()),
        }
    }

    pub fn translate_behavior(&self, behavior: &BehaviorEntry) -> BehaviorEntry {
        match behavior {
            BehaviorEntry::Method(method) => BehaviorEntry::Method(self.translate_method(method)),
            BehaviorEntry::Constructor(ctor) => {
                BehaviorEntry::Constructor(self.translate_constructor(ctor))
            }
        }
    }

    pub fn translate_argument(&self, arg: &ArgumentEntry) -> ArgumentEntry {
        let behavior = self.translate_behavior(&arg.behavior);
        let (obf_behavior, lookup) = match self.direction {
            TranslationDirection::Deobfuscating => (&arg.behavior, &arg.behavior),
            TranslationDirection::Obfuscating => (&behavior, &arg.behavior),
        };
        let name = obf_behavior.signature().and_then(|obf_signature| {
            let mapping = self.behavior_mapping(lookup, obf_behavior.class(), obf_signature)?;
            let argument = mapping.argument(arg.index)?;
            match self.direction {
                TranslationDirection::Deobfuscating => Some(argument.deobf_name().to_owned()),
                TranslationDirection::Obfuscating => (argument.deobf_name() == arg.name)
                    .then(|| argument.obf_name().map(str::to_owned))
                    .flatten(),
            }
        });
        ArgumentEntry {
            behavior,
            index: arg.index,
            name: name.unwrap_or_else(|| arg.name.clone()),
        }
    }

    pub fn translate_entry(&self, entry: &Entry) -> Entry {
        match entry {
            Entry::Class(class) => Entry::Class(self.translate_class(class)),
            Entry::Field(field) => Entry::Field(self.translate_field(field)),
            Entry::Method(method) => Entry::Method(self.translate_method(method)),
            Entry::Constructor(ctor) => Entry::Constructor(self.translate_constructor(ctor)),
            Entry::Argument(arg) => Entry::Argument(self.translate_argument(arg)),
        }
    }

    pub fn translate_reference(&self, reference: &EntryReference) -> EntryReference {
        EntryReference {
            entry: self.translate_entry(&reference.entry),
            context: reference
                .context
                .as_ref()
                .map(|context| self.translate_entry(context)),
            occurrence: reference.occurrence,
        }
    }
}
