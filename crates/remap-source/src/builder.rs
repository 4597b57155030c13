use std::collections::BTreeMap;
use std::sync::Arc;

use remap_core::{ClassEntry, Entry, EntryReference, TextRange, TextSize};
use remap_scheduler::{BlockingTask, Cancelled, Scheduler};

use crate::decompiler::{DecompiledClass, Decompiler, Region, SourceNode, SourceSymbol};
use crate::error::DecompileError;
use crate::index::SourceIndex;
use crate::token::Token;

struct Scope {
    context: Entry,
    occurrences: BTreeMap<Entry, usize>,
}

/// Builds a [`SourceIndex`] from a decompiler's node tree.
///
/// References are attributed to the innermost enclosing class or behavior declaration and
/// numbered per entry within it, in visiting order. Nodes whose region cannot be placed in the
/// text are skipped; tokens that would overlap an earlier token are dropped.
pub struct SourceIndexBuilder {
    index: SourceIndex,
    scopes: Vec<Scope>,
}

impl SourceIndexBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            index: SourceIndex::new(text),
            scopes: Vec::new(),
        }
    }

    pub fn build(decompiled: &DecompiledClass) -> SourceIndex {
        let mut builder = Self::new(decompiled.text.as_str());
        for node in &decompiled.nodes {
            builder.visit(node);
        }
        builder.finish()
    }

    pub fn finish(self) -> SourceIndex {
        self.index
    }

    /// Indexes `node` and its children. Recursion depth follows the syntax tree, which is shallow
    /// for decompiled classes.
    pub fn visit(&mut self, node: &SourceNode) {
        match &node.symbol {
            Some(SourceSymbol::Declaration(entry)) => {
                if let Some(token) = self.token(node.region, entry) {
                    if let Err(err) = self.index.add_declaration(token, entry.clone()) {
                        tracing::warn!(
                            target = "remap.source",
                            entry = %entry,
                            error = %err,
                            "dropped declaration token"
                        );
                    }
                }
                if opens_scope(entry) {
                    self.scopes.push(Scope {
                        context: entry.clone(),
                        occurrences: BTreeMap::new(),
                    });
                    self.visit_children(node);
                    self.scopes.pop();
                    return;
                }
            }
            Some(SourceSymbol::Reference(entry)) => self.add_reference(node.region, entry),
            None => {}
        }
        self.visit_children(node);
    }

    fn visit_children(&mut self, node: &SourceNode) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn add_reference(&mut self, region: Option<Region>, entry: &Entry) {
        let Some(scope) = self.scopes.last_mut() else {
            tracing::debug!(
                target = "remap.source",
                entry = %entry,
                "reference outside any declaration"
            );
            return;
        };
        // Counted even when the token is unusable so later occurrences keep their numbers.
        let occurrence = scope.occurrences.entry(entry.clone()).or_insert(0);
        *occurrence += 1;
        let reference = EntryReference::reference(entry.clone(), scope.context.clone(), *occurrence);

        if let Some(token) = self.token(region, entry) {
            if let Err(err) = self.index.add_reference(token, reference) {
                tracing::warn!(
                    target = "remap.source",
                    entry = %entry,
                    error = %err,
                    "dropped reference token"
                );
            }
        }
    }

    fn token(&self, region: Option<Region>, entry: &Entry) -> Option<Token> {
        let region = region?;
        let Some(range) = self.index.range(region.start, region.end) else {
            tracing::debug!(
                target = "remap.source",
                entry = %entry,
                ?region,
                "skipping node with invalid region"
            );
            return None;
        };
        let mut token = Token::new(range);

        // Inner classes may be printed with their full chain; the token covers the simple name.
        if matches!(entry, Entry::Class(_) | Entry::Constructor(_)) {
            if let Some(idx) = self.index.token_text(token).rfind('$') {
                let start = token.start() + TextSize::from(idx as u32 + 1);
                token = Token::new(TextRange::new(start, token.end()));
            }
        }
        Some(token)
    }
}

fn opens_scope(entry: &Entry) -> bool {
    matches!(
        entry,
        Entry::Class(_) | Entry::Method(_) | Entry::Constructor(_)
    )
}

/// Decompiles `class` and indexes the result on the background pool.
///
/// Cancellation is observed between decompiling and indexing; a cancelled task yields no index.
pub fn spawn_source_index<D>(
    scheduler: &Scheduler,
    decompiler: Arc<D>,
    class: ClassEntry,
) -> BlockingTask<Result<SourceIndex, DecompileError>>
where
    D: Decompiler + ?Sized + 'static,
{
    scheduler.spawn_background(move |token| {
        Cancelled::check(&token)?;
        let decompiled = match decompiler.decompile(&class) {
            Ok(decompiled) => decompiled,
            Err(err) => return Ok(Err(err)),
        };
        Cancelled::check(&token)?;
        let index = SourceIndexBuilder::build(&decompiled);
        tracing::debug!(
            target = "remap.source",
            class = %class,
            tokens = index.tokens().count(),
            "built source index"
        );
        Cancelled::check(&token)?;
        Ok(Ok(index))
    })
}
