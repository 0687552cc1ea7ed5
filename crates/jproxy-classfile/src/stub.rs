use serde::{Deserialize, Serialize};

use crate::access::{self, ACC_PUBLIC, ACC_STATIC};
use crate::classfile::InnerClassInfo;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor};
use crate::error::Result;
use crate::Annotation;

/// Everything the planner needs to know about one class, with visible and invisible annotations
/// merged.
///
/// Stubs are serde-serialisable so class graphs can also be described as JSON fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStub {
    pub internal_name: String,
    pub access_flags: u16,
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Number of formal type parameters.
    #[serde(default)]
    pub arity: u8,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub inner_classes: Vec<InnerClassInfo>,
    #[serde(default)]
    pub fields: Vec<FieldStub>,
    #[serde(default)]
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ClassStub {
    /// Dotted binary name, e.g. `com.acme.Outer$Inner`.
    pub fn binary_name(&self) -> String {
        internal_to_binary_name(&self.internal_name)
    }

    /// Member classes declared directly by this class (the `InnerClasses` attribute also lists
    /// outer classes and classes merely referenced).
    pub fn declared_inner_classes(&self) -> impl Iterator<Item = &InnerClassInfo> {
        self.inner_classes.iter().filter(move |info| {
            info.inner_name.is_some()
                && info.outer_class.as_deref() == Some(self.internal_name.as_str())
        })
    }
}

impl FieldStub {
    pub fn is_public_static(&self) -> bool {
        access::has(self.access_flags, ACC_PUBLIC) && access::has(self.access_flags, ACC_STATIC)
    }

    pub fn field_type(&self) -> Result<FieldType> {
        parse_field_descriptor(&self.descriptor)
    }
}

impl MethodStub {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn method_descriptor(&self) -> Result<MethodDescriptor> {
        parse_method_descriptor(&self.descriptor)
    }
}

pub fn internal_to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}
