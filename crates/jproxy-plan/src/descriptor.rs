use indexmap::IndexSet;
use serde::Serialize;

use jproxy_classfile::access::{self, ACC_ANNOTATION, ACC_ENUM, ACC_INTERFACE};

use crate::policy::MemberKind;
use crate::TypeKey;

/// How a type entered the plan, ordered from weakest to strongest.
///
/// Modes only ever strengthen; merging keeps the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    /// Reached as a parameter, return or field type. Must exist; never inherited from.
    ReferentialOnly,
    /// Reached as a superclass or interface of a type that requested propagation.
    StructuralOnly,
    /// A root, or a type carrying its own `@Java4Cpp`.
    Explicit,
}

impl DiscoveryMode {
    pub fn merge(self, other: DiscoveryMode) -> DiscoveryMode {
        self.max(other)
    }
}

/// Tag on a discovery edge. Only structural edges ground proxy inheritance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Structural,
    Referential,
}

impl EdgeKind {
    pub fn mode(self) -> DiscoveryMode {
        match self {
            EdgeKind::Structural => DiscoveryMode::StructuralOnly,
            EdgeKind::Referential => DiscoveryMode::ReferentialOnly,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    pub fn from_access_flags(flags: u16) -> Self {
        if access::has(flags, ACC_ANNOTATION) {
            TypeKind::Annotation
        } else if access::has(flags, ACC_INTERFACE) {
            TypeKind::Interface
        } else if access::has(flags, ACC_ENUM) {
            TypeKind::Enum
        } else {
            TypeKind::Class
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberDescriptor {
    pub kind: MemberKind,
    /// Java name (`<init>` for constructors, the simple name for inner types).
    pub source_name: String,
    /// JVM descriptor for methods and fields; the inner type's binary name for inner types.
    pub descriptor: String,
    pub proxy_name: String,
    pub included: bool,
    /// Proxied types in the member's signature. Empty for excluded members.
    pub referenced_types: IndexSet<TypeKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub kind: TypeKind,
    pub proxy_name: String,
    pub structural_parent: Option<TypeKey>,
    pub structural_interfaces: IndexSet<TypeKey>,
    pub members: Vec<MemberDescriptor>,
    pub discovery_mode: DiscoveryMode,
}

impl TypeDescriptor {
    pub fn included_members(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter().filter(|member| member.included)
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn structural_targets(&self) -> impl Iterator<Item = &TypeKey> {
        self.structural_parent
            .iter()
            .chain(self.structural_interfaces.iter())
    }

    pub fn referenced_types(&self) -> impl Iterator<Item = (&MemberDescriptor, &TypeKey)> {
        self.included_members().flat_map(|member| {
            member
                .referenced_types
                .iter()
                .map(move |target| (member, target))
        })
    }
}
