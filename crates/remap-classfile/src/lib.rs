#![forbid(unsafe_code)]

//! JVM type descriptors and the class shape supplied by a binary reader.

mod descriptor;
mod error;
mod stub;

pub use crate::descriptor::{BaseType, ReturnType, Signature, Type};
pub use crate::error::{Error, Result};
pub use crate::stub::{ClassStub, FieldStub, MethodStub, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME};
