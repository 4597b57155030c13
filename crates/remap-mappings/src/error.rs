use remap_core::{Entry, EntryKind, IllegalName};
use thiserror::Error;

/// A rename that was refused. The mappings are unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("`{name}` is not a legal name: {reason}")]
    IllegalName { name: String, reason: IllegalName },
    #[error("there is already a {kind} named `{name}` in {scope}")]
    NameCollision {
        name: String,
        kind: EntryKind,
        scope: String,
    },
    #[error("`{entry}` is not declared in this package")]
    ExternalSymbol { entry: Entry },
    #[error("`{entry}` cannot be renamed")]
    NotRenameable { entry: Entry },
}

/// A structural violation while assembling a mapping store directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingsError {
    #[error("duplicate obfuscated {kind} `{name}` in {scope}")]
    DuplicateObfName {
        kind: EntryKind,
        name: String,
        scope: String,
    },
    #[error("duplicate deobfuscated {kind} name `{name}` in {scope}")]
    DuplicateDeobfName {
        kind: EntryKind,
        name: String,
        scope: String,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: {source}")]
    Descriptor {
        line: usize,
        #[source]
        source: remap_classfile::Error,
    },
    #[error("line {line}: {source}")]
    Mappings {
        line: usize,
        #[source]
        source: MappingsError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
