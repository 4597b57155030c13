//! Utilities shared by `remap` tests.
//!
//! Builders for the class shapes a binary reader would produce, so index and matching tests can
//! describe a package in a few lines:
//!
//! ```
//! use remap_test_utils::{ClassBuilder, PackageBuilder};
//!
//! let package = PackageBuilder::new()
//!     .class(ClassBuilder::new("a"))
//!     .class(ClassBuilder::new("b").superclass("a").field("f", "I"))
//!     .build();
//! assert_eq!(package.len(), 2);
//! ```

use remap_classfile::{ClassStub, FieldStub, MethodStub, CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME};

/// Builds one [`ClassStub`]. Descriptors are parsed eagerly and panic when malformed.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    stub: ClassStub,
}

impl ClassBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            stub: ClassStub {
                internal_name: internal_name.to_owned(),
                ..ClassStub::default()
            },
        }
    }

    pub fn superclass(mut self, name: &str) -> Self {
        self.stub.super_class = Some(name.to_owned());
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.stub.interfaces.push(name.to_owned());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let field = FieldStub::parse(name, descriptor)
            .unwrap_or_else(|err| panic!("bad field fixture {name}:{descriptor}: {err}"));
        self.stub.fields.push(field);
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str) -> Self {
        let method = MethodStub::parse(name, descriptor)
            .unwrap_or_else(|err| panic!("bad method fixture {name}{descriptor}: {err}"));
        self.stub.methods.push(method);
        self
    }

    pub fn constructor(self, descriptor: &str) -> Self {
        self.method(CONSTRUCTOR_NAME, descriptor)
    }

    pub fn static_initializer(self) -> Self {
        self.method(STATIC_INITIALIZER_NAME, "()V")
    }

    /// A class mentioned by the bodies of this class's members.
    pub fn reference(mut self, name: &str) -> Self {
        self.stub.references.push(name.to_owned());
        self
    }

    pub fn build(self) -> ClassStub {
        self.stub
    }
}

/// Collects classes into a package, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    classes: Vec<ClassStub>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: ClassBuilder) -> Self {
        self.classes.push(class.build());
        self
    }

    pub fn build(self) -> Vec<ClassStub> {
        self.classes
    }
}
