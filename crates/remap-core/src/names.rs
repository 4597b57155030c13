//! Validation for human-readable names.
//!
//! Names follow Java identifier rules. Class names use `/` between package segments; `$` is
//! reserved for the inner-class chain and is rejected in deobfuscated class segments.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalName {
    Empty,
    InvalidStartChar,
    InvalidChar,
    Keyword,
    EmptySegment,
    InnerClassSeparator,
    PackageSeparator,
}

impl IllegalName {
    pub fn reason(self) -> &'static str {
        match self {
            IllegalName::Empty => "name is empty",
            IllegalName::InvalidStartChar => "must start with a letter, '_' or '$'",
            IllegalName::InvalidChar => "must contain only letters, digits, '_' or '$'",
            IllegalName::Keyword => "is a reserved Java keyword",
            IllegalName::EmptySegment => "has an empty package segment",
            IllegalName::InnerClassSeparator => "class names may not contain '$'",
            IllegalName::PackageSeparator => "inner class names may not contain a package",
        }
    }
}

impl fmt::Display for IllegalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A single Java identifier that is not a reserved word.
pub fn validate_identifier(name: &str) -> Result<(), IllegalName> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(IllegalName::Empty);
    };
    if !is_identifier_start(first) {
        return Err(IllegalName::InvalidStartChar);
    }
    if !chars.all(is_identifier_part) {
        return Err(IllegalName::InvalidChar);
    }
    if is_java_keyword(name) {
        return Err(IllegalName::Keyword);
    }
    Ok(())
}

/// A full class name (`com/example/Foo`).
pub fn validate_class_name(name: &str) -> Result<(), IllegalName> {
    if name.is_empty() {
        return Err(IllegalName::Empty);
    }
    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(IllegalName::EmptySegment);
        }
        validate_class_segment(segment)?;
    }
    Ok(())
}

/// The simple name given to an inner class.
pub fn validate_inner_class_name(name: &str) -> Result<(), IllegalName> {
    if name.contains('/') {
        return Err(IllegalName::PackageSeparator);
    }
    validate_class_segment(name)
}

pub fn validate_field_name(name: &str) -> Result<(), IllegalName> {
    validate_identifier(name)
}

pub fn validate_method_name(name: &str) -> Result<(), IllegalName> {
    validate_identifier(name)
}

pub fn validate_argument_name(name: &str) -> Result<(), IllegalName> {
    validate_identifier(name)
}

fn validate_class_segment(segment: &str) -> Result<(), IllegalName> {
    if segment.contains('$') {
        return Err(IllegalName::InnerClassSeparator);
    }
    validate_identifier(segment)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_java_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
            | "_"
    )
}
