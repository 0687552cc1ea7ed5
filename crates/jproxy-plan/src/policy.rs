//! Member inclusion policy.
//!
//! Every decision goes through [`RULES`], a table keyed by the owner default for the member kind
//! and the two override markers. When both markers are present the wrap marker wins and the
//! decision is flagged as a conflict.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Constructor,
    InnerType,
    StaticField,
}

/// Owner-level defaults taken from `@Java4Cpp(all, staticFields)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerFlags {
    pub all: bool,
    pub static_fields: bool,
}

impl Default for OwnerFlags {
    fn default() -> Self {
        Self {
            all: true,
            static_fields: false,
        }
    }
}

impl OwnerFlags {
    pub fn default_for(self, kind: MemberKind) -> bool {
        match kind {
            MemberKind::Method | MemberKind::Constructor | MemberKind::InnerType => self.all,
            MemberKind::StaticField => self.static_fields,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub included: bool,
    /// Both markers were present.
    pub conflict: bool,
}

struct Rule {
    owner_default: bool,
    wrap: bool,
    no_wrap: bool,
    included: bool,
}

const fn rule(owner_default: bool, wrap: bool, no_wrap: bool, included: bool) -> Rule {
    Rule {
        owner_default,
        wrap,
        no_wrap,
        included,
    }
}

#[rustfmt::skip]
const RULES: [Rule; 8] = [
    //    default wrap   no_wrap included
    rule(true,  false, false, true),
    rule(true,  true,  false, true),
    rule(true,  false, true,  false),
    rule(true,  true,  true,  true),
    rule(false, false, false, false),
    rule(false, true,  false, true),
    rule(false, false, true,  false),
    rule(false, true,  true,  true),
];

pub fn resolve(owner: OwnerFlags, kind: MemberKind, wrap: bool, no_wrap: bool) -> Decision {
    let owner_default = owner.default_for(kind);
    let included = RULES
        .iter()
        .find(|r| r.owner_default == owner_default && r.wrap == wrap && r.no_wrap == no_wrap)
        .is_some_and(|r| r.included);
    Decision {
        included,
        conflict: wrap && no_wrap,
    }
}
