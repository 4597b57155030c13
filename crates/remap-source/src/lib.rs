//! Token-level index of decompiled source.
//!
//! A [`Decompiler`] turns one class into text plus a tree of [`SourceNode`]s;
//! [`SourceIndexBuilder`] turns that into a [`SourceIndex`] mapping spans of the text to the
//! symbols they name.

#![forbid(unsafe_code)]

mod builder;
mod decompiler;
mod error;
mod index;
mod token;

pub use crate::builder::{spawn_source_index, SourceIndexBuilder};
pub use crate::decompiler::{DecompiledClass, Decompiler, Region, SourceNode, SourceSymbol};
pub use crate::error::{DecompileError, SourceIndexError};
pub use crate::index::SourceIndex;
pub use crate::token::Token;
