//! Symbol identities.
//!
//! Entries are plain values: two entries with equal fields name the same symbol. None of them
//! carry a name mapping; translation between namespaces produces new entries.

use std::fmt;

use remap_classfile::{Signature, Type, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME};
use serde::{Deserialize, Serialize};

/// A class identified by its internal name (`com/example/Outer$Inner`).
///
/// Inner classes are encoded as a `$`-separated chain in the last path segment; the outer class
/// and the simple names are derived from the string on demand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassEntry {
    name: String,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `com/example` for `com/example/Foo`, `None` in the default package.
    pub fn package_name(&self) -> Option<&str> {
        self.name.rfind('/').map(|idx| &self.name[..idx])
    }

    /// Last path segment, including any inner-class chain (`Outer$Inner`).
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('/') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    fn chain_start(&self) -> usize {
        self.name.rfind('/').map_or(0, |idx| idx + 1)
    }

    pub fn is_inner_class(&self) -> bool {
        self.simple_name().contains('$')
    }

    /// Name of the outermost class in the chain.
    pub fn outer_class_name(&self) -> &str {
        let start = self.chain_start();
        match self.name[start..].find('$') {
            Some(idx) => &self.name[..start + idx],
            None => &self.name,
        }
    }

    pub fn outer_class(&self) -> ClassEntry {
        ClassEntry::new(self.outer_class_name())
    }

    /// The innermost simple name of an inner class (`Inner` for `Outer$Mid$Inner`).
    pub fn inner_class_name(&self) -> Option<&str> {
        if !self.is_inner_class() {
            return None;
        }
        self.name.rfind('$').map(|idx| &self.name[idx + 1..])
    }

    /// The directly enclosing class of an inner class.
    pub fn enclosing_class(&self) -> Option<ClassEntry> {
        if !self.is_inner_class() {
            return None;
        }
        self.name
            .rfind('$')
            .map(|idx| ClassEntry::new(&self.name[..idx]))
    }

    /// `self$simple_name`.
    pub fn inner_class(&self, simple_name: &str) -> ClassEntry {
        ClassEntry::new(format!("{}${}", self.name, simple_name))
    }

    /// Outermost class first, `self` last.
    pub fn class_chain(&self) -> Vec<ClassEntry> {
        let start = self.chain_start();
        let mut chain = Vec::new();
        for (idx, ch) in self.name[start..].char_indices() {
            if ch == '$' && idx > 0 {
                chain.push(ClassEntry::new(&self.name[..start + idx]));
            }
        }
        chain.push(self.clone());
        chain
    }

    /// Number of classes in the chain; `1` for a top-level class.
    pub fn chain_depth(&self) -> usize {
        self.class_chain().len()
    }
}

impl fmt::Display for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ClassEntry {
    fn from(name: &str) -> Self {
        ClassEntry::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldEntry {
    pub class: ClassEntry,
    pub name: String,
    pub ty: Type,
}

impl FieldEntry {
    pub fn new(class: ClassEntry, name: impl Into<String>, ty: Type) -> Self {
        Self {
            class,
            name: name.into(),
            ty,
        }
    }

    pub fn with_class(&self, class: ClassEntry) -> Self {
        Self {
            class,
            name: self.name.clone(),
            ty: self.ty.clone(),
        }
    }
}

impl fmt::Display for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class, self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodEntry {
    pub class: ClassEntry,
    pub name: String,
    pub signature: Signature,
}

impl MethodEntry {
    pub fn new(class: ClassEntry, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            class,
            name: name.into(),
            signature,
        }
    }

    pub fn with_class(&self, class: ClassEntry) -> Self {
        Self {
            class,
            name: self.name.clone(),
            signature: self.signature.clone(),
        }
    }
}

impl fmt::Display for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.signature)
    }
}

/// A constructor, or the static initializer when `signature` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstructorEntry {
    pub class: ClassEntry,
    pub signature: Option<Signature>,
}

impl ConstructorEntry {
    pub fn new(class: ClassEntry, signature: Signature) -> Self {
        Self {
            class,
            signature: Some(signature),
        }
    }

    pub fn static_initializer(class: ClassEntry) -> Self {
        Self {
            class,
            signature: None,
        }
    }

    pub fn is_static_initializer(&self) -> bool {
        self.signature.is_none()
    }

    pub fn name(&self) -> &'static str {
        if self.is_static_initializer() {
            STATIC_INITIALIZER_NAME
        } else {
            CONSTRUCTOR_NAME
        }
    }

    pub fn with_class(&self, class: ClassEntry) -> Self {
        Self {
            class,
            signature: self.signature.clone(),
        }
    }
}

impl fmt::Display for ConstructorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.name())?;
        if let Some(signature) = &self.signature {
            write!(f, "{signature}")?;
        }
        Ok(())
    }
}

/// A method or a constructor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BehaviorEntry {
    Method(MethodEntry),
    Constructor(ConstructorEntry),
}

impl BehaviorEntry {
    pub fn class(&self) -> &ClassEntry {
        match self {
            BehaviorEntry::Method(method) => &method.class,
            BehaviorEntry::Constructor(ctor) => &ctor.class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BehaviorEntry::Method(method) => &method.name,
            BehaviorEntry::Constructor(ctor) => ctor.name(),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            BehaviorEntry::Method(method) => Some(&method.signature),
            BehaviorEntry::Constructor(ctor) => ctor.signature.as_ref(),
        }
    }

    pub fn with_class(&self, class: ClassEntry) -> Self {
        match self {
            BehaviorEntry::Method(method) => BehaviorEntry::Method(method.with_class(class)),
            BehaviorEntry::Constructor(ctor) => BehaviorEntry::Constructor(ctor.with_class(class)),
        }
    }
}

impl fmt::Display for BehaviorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorEntry::Method(method) => method.fmt(f),
            BehaviorEntry::Constructor(ctor) => ctor.fmt(f),
        }
    }
}

impl From<MethodEntry> for BehaviorEntry {
    fn from(method: MethodEntry) -> Self {
        BehaviorEntry::Method(method)
    }
}

impl From<ConstructorEntry> for BehaviorEntry {
    fn from(ctor: ConstructorEntry) -> Self {
        BehaviorEntry::Constructor(ctor)
    }
}

/// A parameter of a behavior, by zero-based index.
///
/// `name` is the name the decompiler assigned (or the mapped name, after translation).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgumentEntry {
    pub behavior: BehaviorEntry,
    pub index: usize,
    pub name: String,
}

impl ArgumentEntry {
    pub fn new(behavior: impl Into<BehaviorEntry>, index: usize, name: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            index,
            name: name.into(),
        }
    }

    pub fn class(&self) -> &ClassEntry {
        self.behavior.class()
    }

    pub fn with_class(&self, class: ClassEntry) -> Self {
        Self {
            behavior: self.behavior.with_class(class),
            index: self.index,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ArgumentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}({})", self.behavior, self.index, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Class,
    Field,
    Method,
    Constructor,
    Argument,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntryKind::Class => "class",
            EntryKind::Field => "field",
            EntryKind::Method => "method",
            EntryKind::Constructor => "constructor",
            EntryKind::Argument => "argument",
        })
    }
}

/// Any symbol identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entry {
    Class(ClassEntry),
    Field(FieldEntry),
    Method(MethodEntry),
    Constructor(ConstructorEntry),
    Argument(ArgumentEntry),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Class(_) => EntryKind::Class,
            Entry::Field(_) => EntryKind::Field,
            Entry::Method(_) => EntryKind::Method,
            Entry::Constructor(_) => EntryKind::Constructor,
            Entry::Argument(_) => EntryKind::Argument,
        }
    }

    /// The declaring class; a class entry is its own class.
    pub fn class_entry(&self) -> &ClassEntry {
        match self {
            Entry::Class(class) => class,
            Entry::Field(field) => &field.class,
            Entry::Method(method) => &method.class,
            Entry::Constructor(ctor) => &ctor.class,
            Entry::Argument(arg) => arg.class(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::Class(class) => class.name(),
            Entry::Field(field) => &field.name,
            Entry::Method(method) => &method.name,
            Entry::Constructor(ctor) => ctor.name(),
            Entry::Argument(arg) => &arg.name,
        }
    }

    /// The same member moved onto another class. A class entry becomes `class`.
    pub fn with_class(&self, class: ClassEntry) -> Entry {
        match self {
            Entry::Class(_) => Entry::Class(class),
            Entry::Field(field) => Entry::Field(field.with_class(class)),
            Entry::Method(method) => Entry::Method(method.with_class(class)),
            Entry::Constructor(ctor) => Entry::Constructor(ctor.with_class(class)),
            Entry::Argument(arg) => Entry::Argument(arg.with_class(class)),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Class(class) => class.fmt(f),
            Entry::Field(field) => field.fmt(f),
            Entry::Method(method) => method.fmt(f),
            Entry::Constructor(ctor) => ctor.fmt(f),
            Entry::Argument(arg) => arg.fmt(f),
        }
    }
}

impl From<ClassEntry> for Entry {
    fn from(entry: ClassEntry) -> Self {
        Entry::Class(entry)
    }
}

impl From<FieldEntry> for Entry {
    fn from(entry: FieldEntry) -> Self {
        Entry::Field(entry)
    }
}

impl From<MethodEntry> for Entry {
    fn from(entry: MethodEntry) -> Self {
        Entry::Method(entry)
    }
}

impl From<ConstructorEntry> for Entry {
    fn from(entry: ConstructorEntry) -> Self {
        Entry::Constructor(entry)
    }
}

impl From<BehaviorEntry> for Entry {
    fn from(entry: BehaviorEntry) -> Self {
        match entry {
            BehaviorEntry::Method(method) => Entry::Method(method),
            BehaviorEntry::Constructor(ctor) => Entry::Constructor(ctor),
        }
    }
}

impl From<ArgumentEntry> for Entry {
    fn from(entry: ArgumentEntry) -> Self {
        Entry::Argument(entry)
    }
}

// Class substitution. `replace` receives every class name embedded in an entry (declaring
// classes and the classes inside types and signatures) and returns `None` to keep a name.

impl ClassEntry {
    pub fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> ClassEntry {
        match replace(&self.name) {
            Some(name) => ClassEntry::new(name),
            None => self.clone(),
        }
    }
}

impl FieldEntry {
    pub fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> FieldEntry {
        FieldEntry {
            class: self.class.replace_classes(replace),
            name: self.name.clone(),
            ty: self.ty.replace_classes(replace),
        }
    }
}

impl MethodEntry {
    pub fn replace_classes(
        &self,
        replace: &mut impl FnMut(&str) -> Option<String>,
    ) -> MethodEntry {
        MethodEntry {
            class: self.class.replace_classes(replace),
            name: self.name.clone(),
            signature: self.signature.replace_classes(replace),
        }
    }
}

impl ConstructorEntry {
    pub fn replace_classes(
        &self,
        replace: &mut impl FnMut(&str) -> Option<String>,
    ) -> ConstructorEntry {
        ConstructorEntry {
            class: self.class.replace_classes(replace),
            signature: self
                .signature
                .as_ref()
                .map(|signature| signature.replace_classes(replace)),
        }
    }
}

impl BehaviorEntry {
    pub fn replace_classes(
        &self,
        replace: &mut impl FnMut(&str) -> Option<String>,
    ) -> BehaviorEntry {
        match self {
            BehaviorEntry::Method(method) => BehaviorEntry::Method(method.replace_classes(replace)),
            BehaviorEntry::Constructor(ctor) => {
                BehaviorEntry::Constructor(ctor.replace_classes(replace))
            }
        }
    }
}

impl ArgumentEntry {
    pub fn replace_classes(
        &self,
        replace: &mut impl FnMut(&str) -> Option<String>,
    ) -> ArgumentEntry {
        ArgumentEntry {
            behavior: self.behavior.replace_classes(replace),
            index: self.index,
            name: self.name.clone(),
        }
    }
}

impl Entry {
    pub fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Entry {
        match self {
            Entry::Class(class) => Entry::Class(class.replace_classes(replace)),
            Entry::Field(field) => Entry::Field(field.replace_classes(replace)),
            Entry::Method(method) => Entry::Method(method.replace_classes(replace)),
            Entry::Constructor(ctor) => Entry::Constructor(ctor.replace_classes(replace)),
            Entry::Argument(arg) => Entry::Argument(arg.replace_classes(replace)),
        }
    }
}

/// A use of `entry` inside `context`.
///
/// `occurrence` counts, starting at 1, the references to the same entry within one context so a
/// single call site among several identical ones can be addressed. Declarations have no context
/// and occurrence `0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryReference {
    pub entry: Entry,
    pub context: Option<Entry>,
    pub occurrence: usize,
}

impl EntryReference {
    pub fn declaration(entry: impl Into<Entry>) -> Self {
        Self {
            entry: entry.into(),
            context: None,
            occurrence: 0,
        }
    }

    pub fn reference(entry: impl Into<Entry>, context: impl Into<Entry>, occurrence: usize) -> Self {
        Self {
            entry: entry.into(),
            context: Some(context.into()),
            occurrence,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.context.is_none()
    }

    /// The entry a rename of this reference applies to. Constructors are named after their class.
    pub fn renameable_entry(&self) -> Entry {
        match &self.entry {
            Entry::Constructor(ctor) => Entry::Class(ctor.class.clone()),
            entry => entry.clone(),
        }
    }

    /// Smallest reference to `entry` in the derived ordering; used for range scans.
    pub fn lower_bound(entry: &Entry) -> Self {
        Self {
            entry: entry.clone(),
            context: None,
            occurrence: 0,
        }
    }
}

impl fmt::Display for EntryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} in {} (#{})", self.entry, context, self.occurrence),
            None => write!(f, "{} (declaration)", self.entry),
        }
    }
}
