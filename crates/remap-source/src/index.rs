use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use remap_core::{Entry, EntryReference, LineIndex, SourcePosition, TextRange, TextSize};
use remap_mappings::Translator;

use crate::error::SourceIndexError;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    token: Token,
    reference: EntryReference,
}

/// Links spans of one decompiled class to the symbols they name.
///
/// Tokens never overlap. Every token is bound to exactly one [`EntryReference`]; declarations are
/// bound to [`EntryReference::declaration`] and additionally recorded per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIndex {
    text: String,
    lines: LineIndex,
    tokens: BTreeMap<TextSize, Binding>,
    references: BTreeMap<EntryReference, BTreeSet<Token>>,
    declarations: BTreeMap<Entry, Token>,
}

impl SourceIndex {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lines: LineIndex::new(&text),
            text,
            tokens: BTreeMap::new(),
            references: BTreeMap::new(),
            declarations: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_text(&self, token: Token) -> &str {
        self.text.get(Range::<usize>::from(token.range())).unwrap_or_default()
    }

    fn check_token(&self, token: Token) -> Result<(), SourceIndexError> {
        let range = token.range();
        if range.is_empty()
            || range.end() > self.lines.text_len()
            || self.text.get(Range::<usize>::from(range)).is_none()
        {
            return Err(SourceIndexError::InvalidToken { range });
        }
        let before = self.tokens.range(..=token.start()).next_back();
        let after = self.tokens.range(token.start()..).next();
        for binding in before.into_iter().chain(after) {
            if binding.1.token.overlaps(&token) {
                return Err(SourceIndexError::OverlappingToken {
                    range,
                    existing: binding.1.token.range(),
                });
            }
        }
        Ok(())
    }

    fn bind(&mut self, token: Token, reference: EntryReference) {
        self.references
            .entry(reference.clone())
            .or_default()
            .insert(token);
        self.tokens
            .insert(token.start(), Binding { token, reference });
    }

    fn unbind_reference(&mut self, token: Token, reference: &EntryReference) {
        if let Some(tokens) = self.references.get_mut(reference) {
            tokens.remove(&token);
            if tokens.is_empty() {
                self.references.remove(reference);
            }
        }
        if reference.is_declaration() && self.declarations.get(&reference.entry) == Some(&token) {
            self.declarations.remove(&reference.entry);
        }
    }

    pub fn add_declaration(&mut self, token: Token, entry: Entry) -> Result<(), SourceIndexError> {
        self.check_token(token)?;
        self.declarations.insert(entry.clone(), token);
        self.bind(token, EntryReference::declaration(entry));
        Ok(())
    }

    pub fn add_reference(
        &mut self,
        token: Token,
        reference: EntryReference,
    ) -> Result<(), SourceIndexError> {
        self.check_token(token)?;
        if reference.is_declaration() {
            self.declarations.insert(reference.entry.clone(), token);
        }
        self.bind(token, reference);
        Ok(())
    }

    /// The token covering `offset`, if any.
    pub fn token_at(&self, offset: TextSize) -> Option<Token> {
        let (_, binding) = self.tokens.range(..=offset).next_back()?;
        binding.token.contains(offset).then_some(binding.token)
    }

    pub fn reference(&self, token: Token) -> Option<&EntryReference> {
        self.tokens
            .get(&token.start())
            .filter(|binding| binding.token == token)
            .map(|binding| &binding.reference)
    }

    /// The token covering `offset` and what it refers to.
    pub fn entry_at(&self, offset: TextSize) -> Option<(Token, &EntryReference)> {
        let token = self.token_at(offset)?;
        Some((token, self.reference(token)?))
    }

    /// Tokens bound to exactly `reference`, in text order.
    pub fn tokens_for_reference(&self, reference: &EntryReference) -> Vec<Token> {
        self.references
            .get(reference)
            .map(|tokens| tokens.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every token naming `entry`: its declaration and all references, in text order.
    pub fn tokens_for_entry(&self, entry: &Entry) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .references
            .range(EntryReference::lower_bound(entry)..)
            .take_while(|(reference, _)| &reference.entry == entry)
            .flat_map(|(_, tokens)| tokens.iter().copied())
            .collect();
        tokens.sort();
        tokens
    }

    pub fn declaration_token(&self, entry: &Entry) -> Option<Token> {
        self.declarations.get(entry).copied()
    }

    /// All tokens in text order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.tokens.values().map(|binding| binding.token)
    }

    pub fn references(&self) -> impl Iterator<Item = (Token, &EntryReference)> + '_ {
        self.tokens
            .values()
            .map(|binding| (binding.token, &binding.reference))
    }

    pub fn declaration_tokens(&self) -> impl Iterator<Item = (&Entry, Token)> + '_ {
        self.declarations.iter().map(|(entry, token)| (entry, *token))
    }

    /// 1-based line of `offset`.
    pub fn line_number(&self, offset: TextSize) -> u32 {
        self.lines.line_of(offset) + 1
    }

    /// 1-based character column of `offset`.
    pub fn column_number(&self, offset: TextSize) -> u32 {
        self.lines.position(&self.text, offset).column
    }

    pub fn position(&self, offset: TextSize) -> SourcePosition {
        self.lines.position(&self.text, offset)
    }

    pub fn offset(&self, position: SourcePosition) -> Option<TextSize> {
        self.lines.offset(&self.text, position)
    }

    /// Converts a 1-based region to a range of this text.
    pub fn range(&self, start: SourcePosition, end: SourcePosition) -> Option<TextRange> {
        self.lines.range(&self.text, start, end)
    }

    /// Rebinds `token`, returning what it was bound to.
    pub fn replace_reference(
        &mut self,
        token: Token,
        reference: EntryReference,
    ) -> Result<EntryReference, SourceIndexError> {
        let old = self
            .reference(token)
            .cloned()
            .ok_or(SourceIndexError::UnknownToken {
                range: token.range(),
            })?;
        self.unbind_reference(token, &old);
        if reference.is_declaration() {
            self.declarations.insert(reference.entry.clone(), token);
        }
        self.bind(token, reference);
        Ok(old)
    }

    /// The same spans bound to translated references.
    pub fn translated(&self, translator: &Translator<'_>) -> SourceIndex {
        let mut out = SourceIndex {
            text: self.text.clone(),
            lines: self.lines.clone(),
            tokens: BTreeMap::new(),
            references: BTreeMap::new(),
            declarations: BTreeMap::new(),
        };
        for (token, reference) in self.references() {
            let reference = translator.translate_reference(reference);
            if reference.is_declaration() {
                out.declarations.insert(reference.entry.clone(), token);
            }
            out.bind(token, reference);
        }
        out
    }

    /// Rewrites the text so every token shows the name of its translated symbol, and returns the
    /// index of the rewritten text.
    pub fn remapped(&self, translator: &Translator<'_>) -> SourceIndex {
        let mut text = String::with_capacity(self.text.len());
        let mut bindings = Vec::with_capacity(self.tokens.len());
        let mut copied = 0usize;

        for (token, reference) in self.references() {
            let start = usize::from(token.start());
            let end = usize::from(token.end());
            text.push_str(&self.text[copied..start]);

            let reference = translator.translate_reference(reference);
            let new_start = TextSize::of(text.as_str());
            text.push_str(display_name(&reference.entry));
            let new_end = TextSize::of(text.as_str());
            bindings.push((Token::new(TextRange::new(new_start, new_end)), reference));
            copied = end;
        }
        text.push_str(&self.text[copied..]);

        let mut out = SourceIndex::new(text);
        for (token, reference) in bindings {
            if reference.is_declaration() {
                out.declarations.insert(reference.entry.clone(), token);
            }
            out.bind(token, reference);
        }
        out
    }
}

/// The identifier a token shows for `entry`.
pub(crate) fn display_name(entry: &Entry) -> &str {
    let class = match entry {
        Entry::Class(class) => class,
        Entry::Constructor(ctor) => &ctor.class,
        other => return other.name(),
    };
    class
        .inner_class_name()
        .unwrap_or_else(|| class.simple_name())
}
