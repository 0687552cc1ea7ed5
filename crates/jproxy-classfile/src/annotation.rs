use serde::{Deserialize, Serialize};

use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Lcom/acme/Marker;`.
    pub type_descriptor: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        Self {
            type_descriptor: type_descriptor.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.elements.push((name.into(), value));
        self
    }

    /// Internal name of the annotation type (`com/acme/Marker`).
    pub fn type_internal_name(&self) -> Option<&str> {
        descriptor_to_internal_name(&self.type_descriptor)
    }

    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let type_index = reader.read_u2()?;
        let type_descriptor = cp.get_utf8(type_index)?.to_string();

        let num_element_value_pairs = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(num_element_value_pairs);
        for _ in 0..num_element_value_pairs {
            let element_name_index = reader.read_u2()?;
            let name = cp.get_utf8(element_name_index)?.to_string();
            let value = ElementValue::parse(reader, cp)?;
            elements.push((name, value));
        }

        Ok(Self {
            type_descriptor,
            elements,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// Return descriptor of a class literal, e.g. `Ljava/lang/Runnable;`.
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ElementValue::Const(ConstValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElementValue::Const(ConstValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Class literals of an array element value (`Class<?>[]`), as internal names.
    ///
    /// A single class literal is accepted as a one-element array, matching how `javac` lets
    /// users omit the braces.
    pub fn class_list(&self) -> Vec<&str> {
        match self {
            ElementValue::Class(desc) => descriptor_to_internal_name(desc).into_iter().collect(),
            ElementValue::Array(values) => values
                .iter()
                .filter_map(|value| match value {
                    ElementValue::Class(desc) => descriptor_to_internal_name(desc),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let tag = reader.read_u1()? as char;
        match tag {
            'B' | 'C' | 'I' | 'S' | 'Z' => {
                let idx = reader.read_u2()?;
                let value = match cp.get(idx)? {
                    CpInfo::Integer(v) => *v,
                    other => {
                        return Err(Error::ConstantPoolTypeMismatch {
                            index: idx,
                            expected: "Integer",
                            found: other.kind(),
                        })
                    }
                };

                let cv = match tag {
                    'B' => ConstValue::Byte(value as i8),
                    'C' => ConstValue::Char(
                        char::from_u32(value as u32)
                            .ok_or(Error::MalformedAttribute("RuntimeVisibleAnnotations"))?,
                    ),
                    'I' => ConstValue::Int(value),
                    'S' => ConstValue::Short(value as i16),
                    _ => ConstValue::Boolean(value != 0),
                };
                Ok(ElementValue::Const(cv))
            }
            'D' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Double(v) => Ok(ElementValue::Const(ConstValue::Double(*v))),
                    other => Err(Error::ConstantPoolTypeMismatch {
                        index: idx,
                        expected: "Double",
                        found: other.kind(),
                    }),
                }
            }
            'F' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Float(v) => Ok(ElementValue::Const(ConstValue::Float(*v))),
                    other => Err(Error::ConstantPoolTypeMismatch {
                        index: idx,
                        expected: "Float",
                        found: other.kind(),
                    }),
                }
            }
            'J' => {
                let idx = reader.read_u2()?;
                match cp.get(idx)? {
                    CpInfo::Long(v) => Ok(ElementValue::Const(ConstValue::Long(*v))),
                    other => Err(Error::ConstantPoolTypeMismatch {
                        index: idx,
                        expected: "Long",
                        found: other.kind(),
                    }),
                }
            }
            's' => {
                let idx = reader.read_u2()?;
                Ok(ElementValue::Const(ConstValue::String(
                    cp.get_string_constant(idx)?,
                )))
            }
            'e' => {
                let type_name_index = reader.read_u2()?;
                let const_name_index = reader.read_u2()?;
                Ok(ElementValue::Enum {
                    type_descriptor: cp.get_utf8(type_name_index)?.to_string(),
                    const_name: cp.get_utf8(const_name_index)?.to_string(),
                })
            }
            'c' => {
                let class_info_index = reader.read_u2()?;
                Ok(ElementValue::Class(
                    cp.get_utf8(class_info_index)?.to_string(),
                ))
            }
            '@' => Ok(ElementValue::Annotation(Box::new(Annotation::parse(
                reader, cp,
            )?))),
            '[' => {
                let num_values = reader.read_u2()? as usize;
                let mut values = Vec::with_capacity(num_values);
                for _ in 0..num_values {
                    values.push(ElementValue::parse(reader, cp)?);
                }
                Ok(ElementValue::Array(values))
            }
            _ => Err(Error::MalformedAttribute("RuntimeVisibleAnnotations")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<&str> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
}
