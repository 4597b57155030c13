use remap_core::{ClassEntry, TextRange};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceIndexError {
    #[error("token {range:?} overlaps existing token {existing:?}")]
    OverlappingToken { range: TextRange, existing: TextRange },
    #[error("token {range:?} is empty or outside the text")]
    InvalidToken { range: TextRange },
    #[error("no token at {range:?}")]
    UnknownToken { range: TextRange },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompileError {
    #[error("class `{0}` is not part of the package")]
    ClassNotFound(ClassEntry),
    #[error("failed to decompile `{class}`: {message}")]
    Failed { class: ClassEntry, message: String },
}
