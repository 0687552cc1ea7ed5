//! Single-pass classfile parsing into [`ClassStub`].
//!
//! Only the attributes the planner consumes are decoded: the class `Signature` (for arity),
//! runtime annotations on the class and its members, and `InnerClasses`. Everything else,
//! including `Code`, is skipped by length.

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::constant_pool::ConstantPool;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::signature::type_parameter_count;
use crate::stub::{ClassStub, FieldStub, MethodStub};

const MAGIC: u32 = 0xCAFE_BABE;

/// One `InnerClasses` entry. Names are internal names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerClassInfo {
    pub inner_class: String,
    #[serde(default)]
    pub outer_class: Option<String>,
    /// `None` for anonymous classes.
    #[serde(default)]
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassStub {
    /// Parses classfile bytes, keeping visible and invisible annotations together.
    ///
    /// Member descriptors are validated here so later descriptor parsing cannot fail on a stub
    /// that came from bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        // minor, major
        reader.read_bytes(4)?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let internal_name = cp.get_class_name(reader.read_u2()?)?;
        let super_class = optional_class(&cp, reader.read_u2()?)?;
        let interfaces = (0..reader.read_u2()?)
            .map(|_| cp.get_class_name(reader.read_u2()?))
            .collect::<Result<Vec<_>>>()?;

        let fields = (0..reader.read_u2()?)
            .map(|_| {
                let member = RawMember::parse(&mut reader, &cp)?;
                parse_field_descriptor(&member.descriptor)?;
                Ok(FieldStub {
                    access_flags: member.access_flags,
                    name: member.name,
                    descriptor: member.descriptor,
                    annotations: member.annotations,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let methods = (0..reader.read_u2()?)
            .map(|_| {
                let member = RawMember::parse(&mut reader, &cp)?;
                parse_method_descriptor(&member.descriptor)?;
                Ok(MethodStub {
                    access_flags: member.access_flags,
                    name: member.name,
                    descriptor: member.descriptor,
                    annotations: member.annotations,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut arity = 0;
        let mut annotations = Vec::new();
        let mut inner_classes = Vec::new();
        walk_attributes(&mut reader, &cp, |name, body| match name {
            "Signature" => {
                arity = type_parameter_count(cp.get_utf8(body.read_u2()?)?)?;
                body.ensure_empty("Signature")
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                read_annotations(body, &cp, &mut annotations)?;
                body.ensure_empty("annotations")
            }
            "InnerClasses" => {
                for _ in 0..body.read_u2()? {
                    inner_classes.push(InnerClassInfo {
                        inner_class: cp.get_class_name(body.read_u2()?)?,
                        outer_class: optional_class(&cp, body.read_u2()?)?,
                        inner_name: match body.read_u2()? {
                            0 => None,
                            index => Some(cp.get_utf8(index)?.to_owned()),
                        },
                        access_flags: body.read_u2()?,
                    });
                }
                body.ensure_empty("InnerClasses")
            }
            _ => Ok(()),
        })?;
        reader.ensure_empty("classfile")?;

        Ok(ClassStub {
            internal_name,
            access_flags,
            super_class,
            interfaces,
            arity,
            annotations,
            inner_classes,
            fields,
            methods,
        })
    }
}

/// A field or method before its descriptor is checked against its kind.
struct RawMember {
    access_flags: u16,
    name: String,
    descriptor: String,
    annotations: Vec<Annotation>,
}

impl RawMember {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let access_flags = reader.read_u2()?;
        let name = cp.get_utf8(reader.read_u2()?)?.to_owned();
        let descriptor = cp.get_utf8(reader.read_u2()?)?.to_owned();
        let mut annotations = Vec::new();
        walk_attributes(reader, cp, |attribute, body| match attribute {
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                read_annotations(body, cp, &mut annotations)?;
                body.ensure_empty("annotations")
            }
            _ => Ok(()),
        })?;
        Ok(Self {
            access_flags,
            name,
            descriptor,
            annotations,
        })
    }
}

/// Hands each attribute body to `visit`; bodies `visit` ignores are skipped.
fn walk_attributes<'a>(
    reader: &mut Reader<'a>,
    cp: &ConstantPool,
    mut visit: impl FnMut(&str, &mut Reader<'a>) -> Result<()>,
) -> Result<()> {
    for _ in 0..reader.read_u2()? {
        let name = cp.get_utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut body = Reader::new(reader.read_bytes(length)?);
        visit(name, &mut body)?;
    }
    Ok(())
}

fn read_annotations(
    body: &mut Reader<'_>,
    cp: &ConstantPool,
    out: &mut Vec<Annotation>,
) -> Result<()> {
    for _ in 0..body.read_u2()? {
        out.push(Annotation::parse(body, cp)?);
    }
    Ok(())
}

fn optional_class(cp: &ConstantPool, index: u16) -> Result<Option<String>> {
    match index {
        0 => Ok(None),
        index => cp.get_class_name(index).map(Some),
    }
}
