use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::closure::ResolvedTypes;
use crate::descriptor::{DiscoveryMode, EdgeKind, TypeDescriptor};
use crate::error::{PlanDiagnostic, PlanError};
use crate::TypeKey;

/// Namespace in which proxy names must be unique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionScope {
    /// One namespace for every type in the plan.
    #[default]
    Plan,
    /// One namespace per Java package; nested types share their package's namespace.
    Package,
    /// Nested types are scoped by their enclosing type, top-level types by the whole plan.
    Enclosing,
}

#[derive(Clone, Debug, Default)]
pub struct PlanOptions {
    pub collision_scope: CollisionScope,
}

/// The frozen, closure-complete result handed to the emitter.
#[derive(Clone, Debug, Default)]
pub struct WrapPlan {
    types: IndexMap<TypeKey, TypeDescriptor>,
    diagnostics: Vec<PlanDiagnostic>,
}

impl WrapPlan {
    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key)
    }

    /// Lookup by binary name alone, whatever the arity.
    pub fn get_by_name(&self, binary_name: &str) -> Option<&TypeDescriptor> {
        self.types.values().find(|d| d.key.name() == binary_name)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Descriptors in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn diagnostics(&self) -> &[PlanDiagnostic] {
        &self.diagnostics
    }

    /// Types inheriting from `key`, as superclass or interface.
    pub fn structural_children(&self, key: &TypeKey) -> impl Iterator<Item = &TypeDescriptor> + '_ {
        let key = key.clone();
        self.iter()
            .filter(move |d| d.structural_targets().any(|target| *target == key))
    }
}

#[derive(Serialize)]
struct WrapPlanView<'a> {
    types: Vec<&'a TypeDescriptor>,
    diagnostics: &'a [PlanDiagnostic],
}

impl Serialize for WrapPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WrapPlanView {
            types: self.types.values().collect(),
            diagnostics: &self.diagnostics,
        }
        .serialize(serializer)
    }
}

/// Runs the fatal consistency checks and freezes the plan.
pub fn assemble(resolved: ResolvedTypes, options: &PlanOptions) -> Result<WrapPlan, PlanError> {
    let diagnostics: Vec<PlanDiagnostic> = resolved.diagnostics().cloned().collect();
    let types = resolved.types;

    for descriptor in types.values() {
        for target in descriptor.structural_targets() {
            match types.get(target) {
                Some(parent) => debug_assert!(parent.discovery_mode >= DiscoveryMode::StructuralOnly),
                None => {
                    return Err(PlanError::DanglingStructuralReference {
                        owner: descriptor.key.clone(),
                        target: target.clone(),
                    })
                }
            }
        }
    }

    // Blame the member that first requested a missing type.
    if let Some((target, edge)) = resolved
        .unresolved
        .iter()
        .find(|(_, edge)| edge.kind == EdgeKind::Referential)
    {
        return Err(PlanError::UnresolvedReference {
            owner: edge.from.clone(),
            member: edge.member.clone().unwrap_or_default(),
            target: target.clone(),
        });
    }
    for descriptor in types.values() {
        for (member, target) in descriptor.referenced_types() {
            if !types.contains_key(target) {
                return Err(PlanError::UnresolvedReference {
                    owner: descriptor.key.clone(),
                    member: member.source_name.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    let mut seen: HashMap<(&str, &str), &TypeKey> = HashMap::new();
    for descriptor in types.values() {
        let namespace = namespace(&descriptor.key, options.collision_scope);
        if let Some(first) = seen.insert((namespace, descriptor.proxy_name.as_str()), &descriptor.key) {
            return Err(PlanError::NameCollision {
                proxy_name: descriptor.proxy_name.clone(),
                first: first.clone(),
                second: descriptor.key.clone(),
            });
        }
    }

    for diagnostic in &diagnostics {
        tracing::warn!(target: "jproxy.plan", "{diagnostic}");
    }
    tracing::info!(
        target: "jproxy.plan",
        types = types.len(),
        warnings = diagnostics.len(),
        "assembled wrap plan"
    );
    Ok(WrapPlan { types, diagnostics })
}

fn namespace(key: &TypeKey, scope: CollisionScope) -> &str {
    match scope {
        CollisionScope::Plan => "",
        CollisionScope::Package => key.package(),
        CollisionScope::Enclosing => key
            .name()
            .rsplit_once('$')
            .map_or("", |(outer, _)| outer),
    }
}
