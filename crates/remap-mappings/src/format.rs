//! The persisted mapping file.
//!
//! One entry per line, nested by leading tabs:
//!
//! ```text
//! CLASS a com/example/Animal
//! 	FIELD f legs I
//! 	METHOD m speak (La;)V
//! 		ARG 0 other
//! 	CLASS b Leg
//! ```
//!
//! Top-level classes use their full obfuscated name, inner classes their simple obfuscated name.
//! `METHOD` lines omit the deobfuscated name when only arguments are mapped. `ARG` lines carry the
//! original argument name when it is known: `ARG <index> <obf> <deobf>`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use remap_classfile::{Signature, Type};

use crate::error::{MappingsError, ParseError};
use crate::mappings::{ArgumentMapping, ClassMapping, FieldMapping, Mappings, MethodMapping};

pub struct MappingsReader;

struct ClassFrame {
    line: usize,
    mapping: ClassMapping,
}

struct MethodFrame {
    line: usize,
    depth: usize,
    mapping: MethodMapping,
}

#[derive(Default)]
struct ReadState {
    mappings: Mappings,
    classes: Vec<ClassFrame>,
    method: Option<MethodFrame>,
}

fn syntax(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::Syntax {
        line,
        message: message.into(),
    }
}

fn attach(line: usize) -> impl FnOnce(MappingsError) -> ParseError {
    move |source| ParseError::Mappings { line, source }
}

impl ReadState {
    fn close_method(&mut self) -> Result<(), ParseError> {
        let Some(method) = self.method.take() else {
            return Ok(());
        };
        let Some(class) = self.classes.last_mut() else {
            return Err(syntax(method.line, "method outside of a class"));
        };
        class
            .mapping
            .add_method_mapping(method.mapping)
            .map_err(attach(method.line))
    }

    /// Closes classes until `depth` remain open.
    fn unwind_to(&mut self, depth: usize) -> Result<(), ParseError> {
        if self.method.as_ref().is_some_and(|method| method.depth >= depth) {
            self.close_method()?;
        }
        while self.classes.len() > depth {
            let Some(frame) = self.classes.pop() else {
                break;
            };
            match self.classes.last_mut() {
                Some(parent) => parent
                    .mapping
                    .add_inner_class(frame.mapping)
                    .map_err(attach(frame.line))?,
                None => self
                    .mappings
                    .add_class_mapping(frame.mapping)
                    .map_err(attach(frame.line))?,
            }
        }
        Ok(())
    }

    fn class_line(&mut self, line: usize, depth: usize, args: &[&str]) -> Result<(), ParseError> {
        let (obf, deobf) = match args {
            [obf] => (*obf, None),
            [obf, deobf] => (*obf, Some((*deobf).to_owned())),
            _ => return Err(syntax(line, "expected `CLASS <obf> [<deobf>]`")),
        };
        if depth > self.classes.len() {
            return Err(syntax(line, "class is indented too deep"));
        }
        self.unwind_to(depth)?;
        let mapping = match self.classes.last() {
            None => ClassMapping::new(obf, deobf),
            Some(parent) => {
                let outer = parent.mapping.obf_full_name();
                // Older files spell inner classes with their full name.
                let simple = obf
                    .strip_prefix(outer)
                    .and_then(|rest| rest.strip_prefix('$'))
                    .unwrap_or(obf);
                if simple.contains('$') || simple.contains('/') {
                    return Err(syntax(line, format!("`{obf}` is not an inner class of `{outer}`")));
                }
                ClassMapping::new_inner(outer, simple, deobf)
            }
        };
        self.classes.push(ClassFrame { line, mapping });
        Ok(())
    }

    fn member_depth(&mut self, line: usize, depth: usize) -> Result<(), ParseError> {
        if depth == 0 || depth > self.classes.len() {
            return Err(syntax(line, "member is not nested in a class"));
        }
        self.unwind_to(depth)
    }

    fn field_line(&mut self, line: usize, depth: usize, args: &[&str]) -> Result<(), ParseError> {
        let [obf, deobf, descriptor] = args else {
            return Err(syntax(line, "expected `FIELD <obf> <deobf> <type>`"));
        };
        let ty = Type::parse(descriptor).map_err(|source| ParseError::Descriptor { line, source })?;
        self.member_depth(line, depth)?;
        if let Some(class) = self.classes.last_mut() {
            class
                .mapping
                .add_field_mapping(FieldMapping::new(*obf, ty, *deobf))
                .map_err(attach(line))?;
        }
        Ok(())
    }

    fn method_line(&mut self, line: usize, depth: usize, args: &[&str]) -> Result<(), ParseError> {
        let (obf, deobf, descriptor) = match args {
            [obf, descriptor] => (*obf, None, *descriptor),
            [obf, deobf, descriptor] => (*obf, Some((*deobf).to_owned()), *descriptor),
            _ => return Err(syntax(line, "expected `METHOD <obf> [<deobf>] <signature>`")),
        };
        let signature =
            Signature::parse(descriptor).map_err(|source| ParseError::Descriptor { line, source })?;
        self.member_depth(line, depth)?;
        self.method = Some(MethodFrame {
            line,
            depth,
            mapping: MethodMapping::new(obf, signature, deobf),
        });
        Ok(())
    }

    fn arg_line(&mut self, line: usize, depth: usize, args: &[&str]) -> Result<(), ParseError> {
        let (index, obf, deobf) = match args {
            [index, deobf] => (*index, None, *deobf),
            [index, obf, deobf] => (*index, Some((*obf).to_owned()), *deobf),
            _ => return Err(syntax(line, "expected `ARG <index> [<obf>] <deobf>`")),
        };
        let index: usize = index
            .parse()
            .map_err(|_| syntax(line, format!("`{index}` is not an argument index")))?;
        match &mut self.method {
            Some(method) if method.depth + 1 == depth => method
                .mapping
                .add_argument(ArgumentMapping::new(index, obf, deobf))
                .map_err(attach(line)),
            _ => Err(syntax(line, "argument is not nested in a method")),
        }
    }

    fn finish(mut self) -> Result<Mappings, ParseError> {
        self.unwind_to(0)?;
        Ok(self.mappings)
    }
}

impl MappingsReader {
    pub fn read(reader: impl BufRead) -> Result<Mappings, ParseError> {
        let mut state = ReadState::default();
        for (idx, text) in reader.lines().enumerate() {
            let text = text?;
            let line = idx + 1;
            let body = text.trim_start_matches('\t');
            let depth = text.len() - body.len();
            let body = body.trim_end();
            if body.is_empty() {
                continue;
            }
            let mut tokens = body.split(' ').filter(|token| !token.is_empty());
            let keyword = tokens.next().unwrap_or_default();
            let args: Vec<&str> = tokens.collect();
            match keyword {
                "CLASS" => state.class_line(line, depth, &args)?,
                "FIELD" => state.field_line(line, depth, &args)?,
                "METHOD" => state.method_line(line, depth, &args)?,
                "ARG" => state.arg_line(line, depth, &args)?,
                other => return Err(syntax(line, format!("unknown entry `{other}`"))),
            }
        }
        let mappings = state.finish()?;
        tracing::debug!(
            target = "remap.mappings",
            classes = mappings.all_classes().len(),
            "read mappings"
        );
        Ok(mappings)
    }

    pub fn read_str(text: &str) -> Result<Mappings, ParseError> {
        Self::read(text.as_bytes())
    }

    pub fn read_path(path: &Path) -> Result<Mappings, ParseError> {
        Self::read(BufReader::new(File::open(path)?))
    }
}

pub struct MappingsWriter;

impl MappingsWriter {
    /// Writes every mapping, sorted by obfuscated name: fields, then methods, then inner classes.
    pub fn write(mappings: &Mappings, mut out: impl Write) -> io::Result<()> {
        for class in mappings.classes() {
            write_class(&mut out, class, 0)?;
        }
        out.flush()
    }

    pub fn write_string(mappings: &Mappings) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = Self::write(mappings, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn write_path(mappings: &Mappings, path: &Path) -> io::Result<()> {
        Self::write(mappings, BufWriter::new(File::create(path)?))
    }
}

fn indent(out: &mut impl Write, depth: usize) -> io::Result<()> {
    for _ in 0..depth {
        out.write_all(b"\t")?;
    }
    Ok(())
}

fn write_class(out: &mut impl Write, class: &ClassMapping, depth: usize) -> io::Result<()> {
    indent(out, depth)?;
    write!(out, "CLASS {}", class.obf_simple_name())?;
    if let Some(deobf) = class.deobf_name() {
        write!(out, " {deobf}")?;
    }
    writeln!(out)?;

    for field in class.fields() {
        indent(out, depth + 1)?;
        writeln!(
            out,
            "FIELD {} {} {}",
            field.obf_name(),
            field.deobf_name(),
            field.obf_type()
        )?;
    }
    for method in class.methods() {
        indent(out, depth + 1)?;
        write!(out, "METHOD {}", method.obf_name())?;
        if let Some(deobf) = method.deobf_name() {
            write!(out, " {deobf}")?;
        }
        writeln!(out, " {}", method.obf_signature())?;
        for arg in method.arguments() {
            indent(out, depth + 2)?;
            write!(out, "ARG {}", arg.index())?;
            if let Some(obf) = arg.obf_name() {
                write!(out, " {obf}")?;
            }
            writeln!(out, " {}", arg.deobf_name())?;
        }
    }
    for inner in class.inner_classes() {
        write_class(out, inner, depth + 1)?;
    }
    Ok(())
}
