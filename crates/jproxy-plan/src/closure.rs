//! Breadth-first closure over tagged discovery edges.
//!
//! All shared state lives in one [`Accumulator`] threaded through the loop. A type is built at
//! most twice: once on first discovery and once more if an explicit request arrives after a
//! weaker one. Any other repeat discovery can only strengthen the recorded mode.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use serde::Serialize;

use jproxy_classpath::ClassGraph;

use crate::annotations::TypeAnnotation;
use crate::builder::TypeDescriptorBuilder;
use crate::descriptor::{DiscoveryMode, EdgeKind, TypeDescriptor};
use crate::error::{PlanDiagnostic, PlanError};
use crate::naming::NameMapping;
use crate::TypeKey;

/// The discovery edge that first requested a type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: TypeKey,
    pub kind: EdgeKind,
    /// Requesting member, for referential edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

/// Fixpoint of the closure, before consistency checks.
#[derive(Debug, Default)]
pub struct ResolvedTypes {
    /// Descriptors in discovery order.
    pub types: IndexMap<TypeKey, TypeDescriptor>,
    /// Requested types the class graph does not contain.
    pub unresolved: IndexMap<TypeKey, Edge>,
    diagnostics: IndexMap<TypeKey, Vec<PlanDiagnostic>>,
}

impl ResolvedTypes {
    /// Builder diagnostics in discovery order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &PlanDiagnostic> {
        self.diagnostics.values().flatten()
    }
}

struct WorkItem {
    key: TypeKey,
    mode: DiscoveryMode,
    via: Option<Edge>,
}

#[derive(Default)]
struct Accumulator {
    resolved: ResolvedTypes,
    worklist: VecDeque<WorkItem>,
    /// Strongest mode already queued per key.
    queued: HashMap<TypeKey, DiscoveryMode>,
}

impl Accumulator {
    fn known_mode(&self, key: &TypeKey) -> Option<DiscoveryMode> {
        let recorded = self.resolved.types.get(key).map(|d| d.discovery_mode);
        recorded.max(self.queued.get(key).copied())
    }

    fn enqueue(&mut self, key: TypeKey, mode: DiscoveryMode, via: Option<Edge>) {
        if self.known_mode(&key).is_some_and(|known| known >= mode) {
            return;
        }
        self.queued.insert(key.clone(), mode);
        self.worklist.push_back(WorkItem { key, mode, via });
    }
}

pub struct ClosureResolver<'a> {
    graph: &'a dyn ClassGraph,
    builder: TypeDescriptorBuilder<'a>,
}

impl<'a> ClosureResolver<'a> {
    pub fn new(graph: &'a dyn ClassGraph, naming: &'a dyn NameMapping) -> Self {
        Self {
            graph,
            builder: TypeDescriptorBuilder::new(graph, naming),
        }
    }

    pub fn resolve(&self, roots: &[TypeKey]) -> Result<ResolvedTypes, PlanError> {
        let mut acc = Accumulator::default();
        for root in roots {
            if self.graph.class(root.name()).is_none() {
                return Err(PlanError::UnknownRoot { root: root.clone() });
            }
            acc.enqueue(root.clone(), DiscoveryMode::Explicit, None);
        }

        while let Some(item) = acc.worklist.pop_front() {
            self.step(&mut acc, item)?;
        }

        tracing::debug!(
            target: "jproxy.plan",
            roots = roots.len(),
            types = acc.resolved.types.len(),
            unresolved = acc.resolved.unresolved.len(),
            "closure reached fixpoint"
        );
        Ok(acc.resolved)
    }

    fn step(&self, acc: &mut Accumulator, item: WorkItem) -> Result<(), PlanError> {
        let WorkItem { key, mode, via } = item;
        let Some(stub) = self.graph.class(key.name()) else {
            tracing::debug!(target: "jproxy.plan", key = %key, "type not in class graph");
            if let Some(via) = via {
                acc.resolved.unresolved.entry(key).or_insert(via);
            }
            return Ok(());
        };

        let annotation = TypeAnnotation::from_annotations(&stub.annotations);
        let mode = if annotation.is_some() {
            DiscoveryMode::Explicit
        } else {
            mode
        };

        if let Some(existing) = acc.resolved.types.get_mut(&key) {
            if existing.discovery_mode >= mode {
                return Ok(());
            }
            if mode != DiscoveryMode::Explicit {
                // Same defaults, same shape: only the mode moves.
                tracing::debug!(
                    target: "jproxy.plan",
                    key = %key,
                    from = ?existing.discovery_mode,
                    to = ?mode,
                    "strengthened discovery mode"
                );
                existing.discovery_mode = existing.discovery_mode.merge(mode);
                return Ok(());
            }
        }

        let built = self.builder.build(stub, annotation.as_ref(), mode)?;
        let descriptor = built.descriptor;
        tracing::debug!(
            target: "jproxy.plan",
            key = %key,
            mode = ?mode,
            edge = ?via.as_ref().map(|edge| edge.kind),
            "resolved type"
        );

        for target in descriptor.structural_targets() {
            acc.enqueue(
                target.clone(),
                EdgeKind::Structural.mode(),
                Some(Edge {
                    from: key.clone(),
                    kind: EdgeKind::Structural,
                    member: None,
                }),
            );
        }
        for (member, target) in descriptor.referenced_types() {
            acc.enqueue(
                target.clone(),
                EdgeKind::Referential.mode(),
                Some(Edge {
                    from: key.clone(),
                    kind: EdgeKind::Referential,
                    member: Some(member.source_name.clone()),
                }),
            );
        }

        acc.resolved.diagnostics.insert(key.clone(), built.diagnostics);
        // Re-inserting an existing key keeps its discovery position.
        acc.resolved.types.insert(key, descriptor);
        Ok(())
    }
}

/// Every type in the graph carrying `@Java4Cpp`, in the graph's order.
pub fn annotated_roots(graph: &dyn ClassGraph) -> Vec<TypeKey> {
    graph
        .binary_names()
        .filter_map(|name| graph.class(name))
        .filter(|stub| TypeAnnotation::from_annotations(&stub.annotations).is_some())
        .map(|stub| TypeKey::new(stub.binary_name(), stub.arity))
        .collect()
}
