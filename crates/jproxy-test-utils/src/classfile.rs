//! A tiny classfile encoder for tests.

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

#[derive(Debug, Clone)]
pub enum ElementSpec {
    Bool(bool),
    Str(String),
    /// Class literal, given as an internal name (`com/acme/X`).
    Class(String),
    Array(Vec<ElementSpec>),
}

#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    /// Internal name of the annotation type.
    pub type_name: String,
    pub elements: Vec<(String, ElementSpec)>,
}

impl AnnotationSpec {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: ElementSpec) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

#[derive(Debug, Clone)]
pub struct MemberSpec {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<AnnotationSpec>,
}

impl MemberSpec {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone)]
pub struct InnerSpec {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone)]
pub struct ClassSpec {
    pub access_flags: u16,
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub annotations: Vec<AnnotationSpec>,
    pub invisible_annotations: Vec<AnnotationSpec>,
    pub fields: Vec<MemberSpec>,
    pub methods: Vec<MemberSpec>,
    pub inner_classes: Vec<InnerSpec>,
}

impl ClassSpec {
    /// A public class extending `java.lang.Object`.
    pub fn new(name: &str) -> Self {
        Self {
            access_flags: ACC_PUBLIC,
            name: name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    pub fn extends(mut self, super_class: &str) -> Self {
        self.super_class = Some(super_class.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn annotated(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn method(mut self, method: MemberSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn field(mut self, field: MemberSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        ClassWriter::default().write(self)
    }
}

/// Accumulates a constant pool while the class body is written.
#[derive(Default)]
pub struct ClassWriter {
    pool: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    integers: HashMap<i32, u16>,
}

impl ClassWriter {
    fn alloc(&mut self) -> u16 {
        if self.next_index == 0 {
            self.next_index = 1;
        }
        let idx = self.next_index;
        self.next_index += 1;
        idx
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(idx) = self.utf8.get(value) {
            return *idx;
        }
        let idx = self.alloc();
        self.pool.push(1);
        // Test fixtures only use ASCII, which is identical in modified UTF-8.
        self.pool
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        self.utf8.insert(value.to_string(), idx);
        idx
    }

    pub fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(idx) = self.classes.get(internal_name) {
            return *idx;
        }
        let name_index = self.utf8(internal_name);
        let idx = self.alloc();
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.classes.insert(internal_name.to_string(), idx);
        idx
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        if let Some(idx) = self.integers.get(&value) {
            return *idx;
        }
        let idx = self.alloc();
        self.pool.push(3);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.integers.insert(value, idx);
        idx
    }

    pub fn write(mut self, spec: &ClassSpec) -> Vec<u8> {
        let mut body = Vec::new();
        put_u2(&mut body, spec.access_flags);
        let this_class = self.class(&spec.name);
        put_u2(&mut body, this_class);
        let super_class = match &spec.super_class {
            Some(name) => self.class(name),
            None => 0,
        };
        put_u2(&mut body, super_class);

        put_u2(&mut body, spec.interfaces.len() as u16);
        for interface in &spec.interfaces {
            let idx = self.class(interface);
            put_u2(&mut body, idx);
        }

        put_u2(&mut body, spec.fields.len() as u16);
        for field in &spec.fields {
            self.write_member(&mut body, field);
        }
        put_u2(&mut body, spec.methods.len() as u16);
        for method in &spec.methods {
            self.write_member(&mut body, method);
        }

        let mut attrs: Vec<Vec<u8>> = Vec::new();
        if let Some(signature) = &spec.signature {
            let mut info = Vec::new();
            let idx = self.utf8(signature);
            put_u2(&mut info, idx);
            attrs.push(self.attribute("Signature", &info));
        }
        if !spec.annotations.is_empty() {
            let info = self.annotations(&spec.annotations);
            attrs.push(self.attribute("RuntimeVisibleAnnotations", &info));
        }
        if !spec.invisible_annotations.is_empty() {
            let info = self.annotations(&spec.invisible_annotations);
            attrs.push(self.attribute("RuntimeInvisibleAnnotations", &info));
        }
        if !spec.inner_classes.is_empty() {
            let mut info = Vec::new();
            put_u2(&mut info, spec.inner_classes.len() as u16);
            for inner in &spec.inner_classes {
                let inner_idx = self.class(&inner.inner_class);
                let outer_idx = match &inner.outer_class {
                    Some(outer) => self.class(outer),
                    None => 0,
                };
                let name_idx = match &inner.inner_name {
                    Some(name) => self.utf8(name),
                    None => 0,
                };
                put_u2(&mut info, inner_idx);
                put_u2(&mut info, outer_idx);
                put_u2(&mut info, name_idx);
                put_u2(&mut info, inner.access_flags);
            }
            attrs.push(self.attribute("InnerClasses", &info));
        }
        put_u2(&mut body, attrs.len() as u16);
        for attr in attrs {
            body.extend_from_slice(&attr);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u2(&mut out, 0);
        put_u2(&mut out, 52);
        put_u2(&mut out, self.next_index.max(1));
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&body);
        out
    }

    fn write_member(&mut self, body: &mut Vec<u8>, member: &MemberSpec) {
        put_u2(body, member.access_flags);
        let name = self.utf8(&member.name);
        put_u2(body, name);
        let desc = self.utf8(&member.descriptor);
        put_u2(body, desc);
        if member.annotations.is_empty() {
            put_u2(body, 0);
        } else {
            put_u2(body, 1);
            let info = self.annotations(&member.annotations);
            let attr = self.attribute("RuntimeVisibleAnnotations", &info);
            body.extend_from_slice(&attr);
        }
    }

    fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let name_idx = self.utf8(name);
        put_u2(&mut out, name_idx);
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(info);
        out
    }

    fn annotations(&mut self, annotations: &[AnnotationSpec]) -> Vec<u8> {
        let mut out = Vec::new();
        put_u2(&mut out, annotations.len() as u16);
        for annotation in annotations {
            let type_idx = self.utf8(&format!("L{};", annotation.type_name));
            put_u2(&mut out, type_idx);
            put_u2(&mut out, annotation.elements.len() as u16);
            for (name, value) in &annotation.elements {
                let name_idx = self.utf8(name);
                put_u2(&mut out, name_idx);
                self.element(&mut out, value);
            }
        }
        out
    }

    fn element(&mut self, out: &mut Vec<u8>, value: &ElementSpec) {
        match value {
            ElementSpec::Bool(value) => {
                out.push(b'Z');
                let idx = self.integer(i32::from(*value));
                put_u2(out, idx);
            }
            ElementSpec::Str(value) => {
                out.push(b's');
                let idx = self.utf8(value);
                put_u2(out, idx);
            }
            ElementSpec::Class(name) => {
                out.push(b'c');
                let idx = self.utf8(&format!("L{name};"));
                put_u2(out, idx);
            }
            ElementSpec::Array(values) => {
                out.push(b'[');
                put_u2(out, values.len() as u16);
                for value in values {
                    self.element(out, value);
                }
            }
        }
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}
