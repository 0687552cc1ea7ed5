use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::policy::MemberKind;
use crate::TypeKey;

/// Fatal resolution failures. No partial plan is produced.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("root type `{root}` is not in the class graph")]
    UnknownRoot { root: TypeKey },
    #[error("`{owner}` inherits from `{target}`, which is not wrapped")]
    DanglingStructuralReference { owner: TypeKey, target: TypeKey },
    #[error("`{owner}.{member}` references `{target}`, which is not in the class graph")]
    UnresolvedReference {
        owner: TypeKey,
        member: String,
        target: TypeKey,
    },
    #[error("proxy name `{proxy_name}` is produced by both `{first}` and `{second}`")]
    NameCollision {
        proxy_name: String,
        first: TypeKey,
        second: TypeKey,
    },
    #[error("invalid descriptor on `{owner}.{member}`: {source}")]
    InvalidDescriptor {
        owner: TypeKey,
        member: String,
        #[source]
        source: jproxy_classfile::Error,
    },
}

/// Non-fatal findings reported next to a complete plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum PlanDiagnostic {
    /// Both wrap and no-wrap markers on one member; the member is included.
    ConflictingMemberOverride {
        owner: TypeKey,
        member: String,
        kind: MemberKind,
    },
    /// A `@Java4CppWrappe` value on a constructor; constructors always take the owner's name.
    IgnoredConstructorRename { owner: TypeKey, rename: String },
}

impl PlanDiagnostic {
    pub fn owner(&self) -> &TypeKey {
        match self {
            PlanDiagnostic::ConflictingMemberOverride { owner, .. }
            | PlanDiagnostic::IgnoredConstructorRename { owner, .. } => owner,
        }
    }
}

impl fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanDiagnostic::ConflictingMemberOverride { owner, member, .. } => write!(
                f,
                "`{owner}.{member}` carries both wrap and no-wrap markers; wrapping it"
            ),
            PlanDiagnostic::IgnoredConstructorRename { owner, rename } => write!(
                f,
                "constructor rename `{rename}` on `{owner}` ignored; constructors use the type's proxy name"
            ),
        }
    }
}
