use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// The class named by this type once array dimensions are peeled off, if any.
    pub fn element_class(&self) -> Option<&str> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(component) => component.element_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// Classes mentioned by the signature: parameters first, then the return type.
    pub fn element_classes(&self) -> impl Iterator<Item = &str> {
        let ret = match &self.return_type {
            ReturnType::Void => None,
            ReturnType::Type(ty) => ty.element_class(),
        };
        self.params
            .iter()
            .filter_map(FieldType::element_class)
            .chain(ret)
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    let (return_type, rest) = if let Some(after) = rest.strip_prefix('V') {
        (ReturnType::Void, after)
    } else {
        let (ty, after) =
            parse_field_type(rest).map_err(|_| Error::InvalidDescriptor(desc.to_string()))?;
        (ReturnType::Type(ty), after)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let Some(first) = input.chars().next() else {
        return Err(Error::InvalidDescriptor(input.to_string()));
    };
    let rest = &input[first.len_utf8()..];
    let base = match first {
        'B' => Some(BaseType::Byte),
        'C' => Some(BaseType::Char),
        'D' => Some(BaseType::Double),
        'F' => Some(BaseType::Float),
        'I' => Some(BaseType::Int),
        'J' => Some(BaseType::Long),
        'S' => Some(BaseType::Short),
        'Z' => Some(BaseType::Boolean),
        _ => None,
    };
    if let Some(base) = base {
        return Ok((FieldType::Base(base), rest));
    }
    match first {
        'L' => match rest.find(';') {
            Some(0) | None => Err(Error::InvalidDescriptor(input.to_string())),
            Some(end) => Ok((FieldType::Object(rest[..end].to_string()), &rest[end + 1..])),
        },
        '[' => {
            let (component, rest) = parse_field_type(rest)?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}
