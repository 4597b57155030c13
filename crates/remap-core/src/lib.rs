#![forbid(unsafe_code)]

//! Symbol identities, name rules, and the source line table shared by every `remap` crate.

pub mod entry;
pub mod names;
pub mod text;

pub use crate::entry::{
    ArgumentEntry, BehaviorEntry, ClassEntry, ConstructorEntry, Entry, EntryKind, EntryReference,
    FieldEntry, MethodEntry,
};
pub use crate::names::IllegalName;
pub use crate::text::{LineIndex, SourcePosition, TextRange, TextSize};

pub use remap_classfile::{ReturnType, Signature, Type};
