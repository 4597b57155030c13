use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn from_descriptor_char(c: u8) -> Option<Self> {
        Some(match c {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

/// A JVM field type descriptor (`I`, `Lcom/example/Foo;`, `[[J`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Base(BaseType),
    Object(String),
    Array(Box<Type>),
}

impl Type {
    pub fn parse(desc: &str) -> Result<Self> {
        let (ty, rest) = parse_type(desc)?;
        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        Ok(ty)
    }

    pub fn object(class_name: impl Into<String>) -> Self {
        Type::Object(class_name.into())
    }

    pub fn array_of(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    /// The innermost non-array component.
    pub fn element_type(&self) -> &Type {
        let mut ty = self;
        while let Type::Array(component) = ty {
            ty = component;
        }
        ty
    }

    pub fn array_dimension(&self) -> usize {
        let mut dims = 0;
        let mut ty = self;
        while let Type::Array(component) = ty {
            dims += 1;
            ty = component;
        }
        dims
    }

    /// The class named by this type, looking through arrays.
    pub fn class_name(&self) -> Option<&str> {
        match self.element_type() {
            Type::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Returns a copy of this type with the embedded class name substituted.
    ///
    /// `replace` returning `None` keeps the original name.
    pub fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Type {
        match self {
            Type::Base(base) => Type::Base(*base),
            Type::Object(name) => Type::Object(replace(name).unwrap_or_else(|| name.clone())),
            Type::Array(component) => Type::Array(Box::new(component.replace_classes(replace))),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => write!(f, "{}", base.descriptor_char()),
            Type::Object(name) => write!(f, "L{name};"),
            Type::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Type::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReturnType {
    Void,
    Type(Type),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// A JVM method descriptor: parameter types plus a return type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    pub params: Vec<Type>,
    pub return_type: ReturnType,
}

impl Signature {
    pub fn parse(desc: &str) -> Result<Self> {
        let invalid = || Error::InvalidSignature(desc.to_string());
        let mut rest = desc.strip_prefix('(').ok_or_else(invalid)?;

        let mut params = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(invalid());
            }
            let (param, after) = parse_type(rest).map_err(|_| invalid())?;
            params.push(param);
            rest = after;
        }

        let (return_type, rest) = if let Some(after) = rest.strip_prefix('V') {
            (ReturnType::Void, after)
        } else {
            let (ty, after) = parse_type(rest).map_err(|_| invalid())?;
            (ReturnType::Type(ty), after)
        };

        if !rest.is_empty() {
            return Err(invalid());
        }

        Ok(Signature {
            params,
            return_type,
        })
    }

    /// Every class name mentioned by the parameters and the return type, in order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        let ret = match &self.return_type {
            ReturnType::Void => None,
            ReturnType::Type(ty) => Some(ty),
        };
        self.params
            .iter()
            .chain(ret)
            .filter_map(|ty| ty.class_name())
    }

    pub fn replace_classes(&self, replace: &mut impl FnMut(&str) -> Option<String>) -> Signature {
        Signature {
            params: self
                .params
                .iter()
                .map(|param| param.replace_classes(replace))
                .collect(),
            return_type: match &self.return_type {
                ReturnType::Void => ReturnType::Void,
                ReturnType::Type(ty) => ReturnType::Type(ty.replace_classes(replace)),
            },
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Signature::parse(s)
    }
}

fn parse_type(input: &str) -> Result<(Type, &str)> {
    let bytes = input.as_bytes();
    let Some(&first) = bytes.first() else {
        return Err(Error::InvalidDescriptor(input.to_string()));
    };
    if let Some(base) = BaseType::from_descriptor_char(first) {
        return Ok((Type::Base(base), &input[1..]));
    }
    match first {
        b'L' => match input.find(';') {
            Some(end) if end > 1 => {
                let name = &input[1..end];
                Ok((Type::Object(name.to_string()), &input[end + 1..]))
            }
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        b'[' => {
            let (component, rest) = parse_type(&input[1..])?;
            Ok((Type::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}
