use remap_core::{ClassEntry, Entry, SourcePosition};

use crate::error::DecompileError;

/// Produces annotated source for one outer class.
pub trait Decompiler: Send + Sync {
    fn decompile(&self, class: &ClassEntry) -> Result<DecompiledClass, DecompileError>;
}

/// Generated source text and the syntax nodes that name symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompiledClass {
    pub text: String,
    pub nodes: Vec<SourceNode>,
}

/// A 1-based region of the text; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl Region {
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: SourcePosition::new(start_line, start_column),
            end: SourcePosition::new(end_line, end_column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSymbol {
    /// The node declares the entry. Class and behavior declarations scope the references among
    /// their children.
    Declaration(Entry),
    /// The node names an entry declared elsewhere.
    Reference(Entry),
}

/// One node of the decompiler's syntax tree. `region` covers the identifier that names the
/// symbol, when the decompiler knows it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceNode {
    pub region: Option<Region>,
    pub symbol: Option<SourceSymbol>,
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    pub fn declaration(entry: impl Into<Entry>, region: Option<Region>) -> Self {
        Self {
            region,
            symbol: Some(SourceSymbol::Declaration(entry.into())),
            children: Vec::new(),
        }
    }

    pub fn reference(entry: impl Into<Entry>, region: Option<Region>) -> Self {
        Self {
            region,
            symbol: Some(SourceSymbol::Reference(entry.into())),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SourceNode>) -> Self {
        self.children.extend(children);
        self
    }
}
