//! Name mappings between the obfuscated and the human-readable namespace.
//!
//! [`Mappings`] stores the names, [`Renamer`] is the checked way to change them, and
//! [`Translator`] applies them to entries, types and signatures.

#![forbid(unsafe_code)]

mod checker;
mod error;
mod format;
mod mappings;
mod renamer;
mod translator;

pub use crate::checker::MappingsChecker;
pub use crate::error::{MappingsError, ParseError, RenameError};
pub use crate::format::{MappingsReader, MappingsWriter};
pub use crate::mappings::{ArgumentMapping, ClassMapping, FieldMapping, Mappings, MethodMapping};
pub use crate::renamer::Renamer;
pub use crate::translator::{TranslationDirection, Translator};
