#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;
mod stub;

pub mod access;

pub use crate::annotation::{descriptor_to_internal_name, Annotation, ConstValue, ElementValue};
pub use crate::classfile::InnerClassInfo;
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::type_parameter_count;
pub use crate::stub::{internal_to_binary_name, ClassStub, FieldStub, MethodStub};
