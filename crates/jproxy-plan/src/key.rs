use std::fmt;

use serde::{Deserialize, Serialize};

use jproxy_classpath::ClassGraph;

/// Identity of a source type: dotted binary name plus generic arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    arity: u8,
}

fn is_zero(arity: &u8) -> bool {
    *arity == 0
}

impl TypeKey {
    pub fn new(name: impl Into<String>, arity: u8) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Key for `binary_name`, taking the arity from the graph when the type is known.
    pub fn resolve(graph: &dyn ClassGraph, binary_name: &str) -> Self {
        let arity = graph.class(binary_name).map_or(0, |stub| stub.arity);
        Self::new(binary_name, arity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// `Inner` for `com.acme.Outer$Inner`.
    pub fn simple_name(&self) -> &str {
        let after_package = self.name.rsplit('.').next().unwrap_or(&self.name);
        after_package.rsplit('$').next().unwrap_or(after_package)
    }

    /// `com.acme` for `com.acme.Outer$Inner`; empty for the default package.
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arity == 0 {
            f.write_str(&self.name)
        } else {
            write!(f, "{}<{}>", self.name, self.arity)
        }
    }
}
