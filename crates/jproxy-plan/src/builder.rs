use indexmap::IndexSet;

use jproxy_classfile::access::{self, ACC_BRIDGE, ACC_PUBLIC, ACC_SYNTHETIC};
use jproxy_classfile::{internal_to_binary_name, ClassStub, MethodStub};
use jproxy_classpath::ClassGraph;

use crate::annotations::{MemberMarkers, TypeAnnotation};
use crate::descriptor::{DiscoveryMode, MemberDescriptor, TypeDescriptor, TypeKind};
use crate::error::{PlanDiagnostic, PlanError};
use crate::naming::NameMapping;
use crate::policy::{self, MemberKind, OwnerFlags};
use crate::TypeKey;

const OBJECT: &str = "java.lang.Object";

/// Output of [`TypeDescriptorBuilder::build`].
#[derive(Debug)]
pub struct BuiltType {
    pub descriptor: TypeDescriptor,
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Builds one [`TypeDescriptor`] from a class stub. Holds no mutable state.
pub struct TypeDescriptorBuilder<'a> {
    graph: &'a dyn ClassGraph,
    naming: &'a dyn NameMapping,
}

impl<'a> TypeDescriptorBuilder<'a> {
    pub fn new(graph: &'a dyn ClassGraph, naming: &'a dyn NameMapping) -> Self {
        Self { graph, naming }
    }

    /// `annotation` is the type's own `@Java4Cpp`; without one the annotation defaults apply.
    pub fn build(
        &self,
        stub: &ClassStub,
        annotation: Option<&TypeAnnotation>,
        mode: DiscoveryMode,
    ) -> Result<BuiltType, PlanError> {
        let defaults = TypeAnnotation::default();
        let annotation = annotation.unwrap_or(&defaults);
        let key = TypeKey::new(stub.binary_name(), stub.arity);
        // Must agree with the name the enclosing type gives this type as an inner member.
        let rename = MemberMarkers::from_annotations(&stub.annotations)
            .rename
            .or_else(|| annotation.name.clone());
        let proxy_name = self
            .naming
            .escape(rename.as_deref().unwrap_or(key.simple_name()));

        let mut walk = MemberWalk {
            builder: self,
            owner: &key,
            owner_proxy_name: &proxy_name,
            flags: annotation.owner_flags(),
            members: Vec::new(),
            diagnostics: Vec::new(),
        };
        for method in stub.methods.iter().filter(|m| is_wrappable_method(m)) {
            walk.method(method)?;
        }
        for inner in stub.declared_inner_classes() {
            if !access::has(inner.access_flags, ACC_PUBLIC) {
                continue;
            }
            if let Some(simple_name) = inner.inner_name.as_deref() {
                walk.inner_type(&internal_to_binary_name(&inner.inner_class), simple_name)?;
            }
        }
        for field in stub.fields.iter().filter(|f| f.is_public_static()) {
            let markers = MemberMarkers::from_annotations(&field.annotations);
            let referenced = |builder: &Self| -> Result<IndexSet<TypeKey>, PlanError> {
                let ty = field.field_type().map_err(|source| PlanError::InvalidDescriptor {
                    owner: key.clone(),
                    member: field.name.clone(),
                    source,
                })?;
                Ok(builder.proxied_internal(ty.element_class()))
            };
            walk.push(
                MemberKind::StaticField,
                &field.name,
                &field.descriptor,
                markers,
                referenced,
            )?;
        }
        let MemberWalk {
            members,
            diagnostics,
            ..
        } = walk;

        let (structural_parent, structural_interfaces) = self.structural_candidates(stub, annotation);

        tracing::trace!(
            target: "jproxy.plan",
            key = %key,
            proxy_name = %proxy_name,
            members = members.len(),
            "built type descriptor"
        );

        Ok(BuiltType {
            descriptor: TypeDescriptor {
                kind: TypeKind::from_access_flags(stub.access_flags),
                key,
                proxy_name,
                structural_parent,
                structural_interfaces,
                members,
                discovery_mode: mode,
            },
            diagnostics,
        })
    }

    fn structural_candidates(
        &self,
        stub: &ClassStub,
        annotation: &TypeAnnotation,
    ) -> (Option<TypeKey>, IndexSet<TypeKey>) {
        let parent = stub
            .super_class
            .as_deref()
            .filter(|_| annotation.superclass)
            .map(internal_to_binary_name)
            .and_then(|name| self.proxied_key(&name));

        let declared: Vec<String> = stub
            .interfaces
            .iter()
            .map(|name| internal_to_binary_name(name))
            .collect();
        let selected = declared.iter().filter(|name| {
            if annotation.interfaces {
                !annotation.no_wrappe_interfaces.contains(name)
            } else {
                annotation.wrappe_interfaces.contains(name)
            }
        });
        let interfaces = selected.filter_map(|name| self.proxied_key(name)).collect();

        if !annotation.interfaces {
            for listed in &annotation.wrappe_interfaces {
                if !declared.contains(listed) {
                    tracing::debug!(
                        target: "jproxy.plan",
                        class = %stub.binary_name(),
                        interface = %listed,
                        "ignoring wrappeInterfaces entry the type does not implement"
                    );
                }
            }
        }

        (parent, interfaces)
    }

    /// `None` for the universal root and for natively mapped types.
    fn proxied_key(&self, binary_name: &str) -> Option<TypeKey> {
        if binary_name == OBJECT {
            return None;
        }
        let key = TypeKey::resolve(self.graph, binary_name);
        self.naming.native_type(&key).is_none().then_some(key)
    }

    fn proxied_internal<'n>(
        &self,
        internal_names: impl IntoIterator<Item = &'n str>,
    ) -> IndexSet<TypeKey> {
        internal_names
            .into_iter()
            .filter_map(|name| self.proxied_key(&internal_to_binary_name(name)))
            .collect()
    }
}

struct MemberWalk<'b, 'a> {
    builder: &'b TypeDescriptorBuilder<'a>,
    owner: &'b TypeKey,
    owner_proxy_name: &'b str,
    flags: OwnerFlags,
    members: Vec<MemberDescriptor>,
    diagnostics: Vec<PlanDiagnostic>,
}

impl<'a> MemberWalk<'_, 'a> {
    fn method(&mut self, method: &MethodStub) -> Result<(), PlanError> {
        let kind = if method.is_constructor() {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        };
        let markers = MemberMarkers::from_annotations(&method.annotations);
        let owner = self.owner;
        self.push(kind, &method.name, &method.descriptor, markers, |builder| {
            let descriptor =
                method
                    .method_descriptor()
                    .map_err(|source| PlanError::InvalidDescriptor {
                        owner: owner.clone(),
                        member: format!("{}{}", method.name, method.descriptor),
                        source,
                    })?;
            Ok(builder.proxied_internal(descriptor.element_classes()))
        })
    }

    fn inner_type(&mut self, binary_name: &str, simple_name: &str) -> Result<(), PlanError> {
        let markers = self
            .builder
            .graph
            .class(binary_name)
            .map(|stub| MemberMarkers::for_inner_type(&stub.annotations))
            .unwrap_or_default();
        self.push(
            MemberKind::InnerType,
            simple_name,
            binary_name,
            markers,
            |builder| Ok(builder.proxied_key(binary_name).into_iter().collect()),
        )
    }

    fn push(
        &mut self,
        kind: MemberKind,
        source_name: &str,
        descriptor: &str,
        markers: MemberMarkers,
        referenced: impl FnOnce(&TypeDescriptorBuilder<'a>) -> Result<IndexSet<TypeKey>, PlanError>,
    ) -> Result<(), PlanError> {
        let decision = policy::resolve(self.flags, kind, markers.wrap, markers.no_wrap);
        if decision.conflict {
            self.diagnostics
                .push(PlanDiagnostic::ConflictingMemberOverride {
                    owner: self.owner.clone(),
                    member: member_label(kind, source_name, descriptor),
                    kind,
                });
        }

        let proxy_name = match (kind, markers.rename) {
            (MemberKind::Constructor, rename) => {
                if let Some(rename) = rename {
                    self.diagnostics
                        .push(PlanDiagnostic::IgnoredConstructorRename {
                            owner: self.owner.clone(),
                            rename,
                        });
                }
                self.owner_proxy_name.to_string()
            }
            (_, rename) => self
                .builder
                .naming
                .escape(rename.as_deref().unwrap_or(source_name)),
        };

        let referenced_types = if decision.included {
            referenced(self.builder)?
        } else {
            IndexSet::new()
        };

        self.members.push(MemberDescriptor {
            kind,
            source_name: source_name.to_string(),
            descriptor: descriptor.to_string(),
            proxy_name,
            included: decision.included,
            referenced_types,
        });
        Ok(())
    }
}

fn member_label(kind: MemberKind, source_name: &str, descriptor: &str) -> String {
    match kind {
        MemberKind::Method | MemberKind::Constructor => format!("{source_name}{descriptor}"),
        MemberKind::InnerType | MemberKind::StaticField => source_name.to_string(),
    }
}

fn is_wrappable_method(method: &MethodStub) -> bool {
    access::has(method.access_flags, ACC_PUBLIC)
        && !access::has(method.access_flags, ACC_SYNTHETIC | ACC_BRIDGE)
        && method.name != "<clinit>"
}
