use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidDescriptor(String),
    InvalidSignature(String),
    InvalidMemberName(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDescriptor(desc) => write!(f, "invalid type descriptor: {desc}"),
            Error::InvalidSignature(sig) => write!(f, "invalid method signature: {sig}"),
            Error::InvalidMemberName(name) => write!(f, "invalid member name: {name:?}"),
        }
    }
}

impl std::error::Error for Error {}
