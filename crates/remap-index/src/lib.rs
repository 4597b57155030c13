#![forbid(unsafe_code)]

//! Structural indexes over one version of an obfuscated package.

mod package;
mod translation;

pub use package::{ClassRecord, PackageIndex};
pub use translation::TranslationIndex;
