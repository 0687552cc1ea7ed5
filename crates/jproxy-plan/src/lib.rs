//! Wrap-plan resolution for Java4Cpp proxies.
//!
//! Starting from explicitly annotated roots, [`Planner`] walks the class graph along tagged
//! discovery edges until no new types appear, then checks the result and freezes it into a
//! [`WrapPlan`]:
//!
//! - [`policy`] decides whether each member is wrapped,
//! - [`TypeDescriptorBuilder`] turns one class into a [`TypeDescriptor`],
//! - [`ClosureResolver`] drives the builder to a fixpoint,
//! - [`assemble`] rejects dangling inheritance, unresolved references and name collisions.
//!
//! Structural edges (superclass, interfaces) give proxy inheritance; referential edges
//! (parameters, return values, fields, inner types) only force the type to exist.

#![forbid(unsafe_code)]

mod annotations;
mod builder;
mod closure;
mod descriptor;
mod error;
mod key;
mod naming;
mod plan;

pub mod policy;

use jproxy_classpath::ClassGraph;

pub use crate::annotations::{MemberMarkers, TypeAnnotation};
pub use crate::builder::{BuiltType, TypeDescriptorBuilder};
pub use crate::closure::{annotated_roots, ClosureResolver, Edge, ResolvedTypes};
pub use crate::descriptor::{
    DiscoveryMode, EdgeKind, MemberDescriptor, TypeDescriptor, TypeKind,
};
pub use crate::error::{PlanDiagnostic, PlanError};
pub use crate::key::TypeKey;
pub use crate::naming::{CppNameMapping, NameMapping, CPP_KEYWORDS, DEFAULT_ESCAPE_SUFFIX};
pub use crate::plan::{assemble, CollisionScope, PlanOptions, WrapPlan};
pub use crate::policy::{MemberKind, OwnerFlags};

/// Entry point tying the closure and the assembler together.
pub struct Planner<'a> {
    graph: &'a dyn ClassGraph,
    naming: &'a dyn NameMapping,
    options: PlanOptions,
}

impl<'a> Planner<'a> {
    pub fn new(graph: &'a dyn ClassGraph, naming: &'a dyn NameMapping) -> Self {
        Self {
            graph,
            naming,
            options: PlanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    /// Key for a dotted binary name, with the arity the graph declares.
    pub fn key(&self, binary_name: &str) -> TypeKey {
        TypeKey::resolve(self.graph, binary_name)
    }

    pub fn resolve(&self, roots: &[TypeKey]) -> Result<WrapPlan, PlanError> {
        let resolved = ClosureResolver::new(self.graph, self.naming).resolve(roots)?;
        assemble(resolved, &self.options)
    }

    /// Resolves with every `@Java4Cpp` type in the graph as a root.
    pub fn resolve_annotated(&self) -> Result<WrapPlan, PlanError> {
        self.resolve(&annotated_roots(self.graph))
    }
}
