use crate::descriptor::{Signature, Type};
use crate::error::{Error, Result};

pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// The per-class shape a binary reader hands to the indexer.
///
/// `references` lists the classes mentioned by member bodies (constant pool class entries); it
/// only feeds reference-aware class matching and may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassStub {
    pub internal_name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStub {
    pub name: String,
    pub descriptor: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodStub {
    pub name: String,
    pub descriptor: Signature,
}

impl FieldStub {
    pub fn parse(name: &str, descriptor: &str) -> Result<Self> {
        if name.is_empty() || name.starts_with('<') {
            return Err(Error::InvalidMemberName(name.to_string()));
        }
        Ok(FieldStub {
            name: name.to_string(),
            descriptor: Type::parse(descriptor)?,
        })
    }
}

impl MethodStub {
    pub fn parse(name: &str, descriptor: &str) -> Result<Self> {
        let special = name.starts_with('<');
        if name.is_empty()
            || (special && name != CONSTRUCTOR_NAME && name != STATIC_INITIALIZER_NAME)
        {
            return Err(Error::InvalidMemberName(name.to_string()));
        }
        Ok(MethodStub {
            name: name.to_string(),
            descriptor: Signature::parse(descriptor)?,
        })
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }
}
