//! Decoding of the Java4Cpp annotation vocabulary.
//!
//! Both the legacy `com.github.loicoudot` package and the current
//! `com.github.loicoudot.java4cpp` package are recognised.

use jproxy_classfile::{internal_to_binary_name, Annotation};

use crate::policy::OwnerFlags;

const TYPE_MARKERS: [&str; 2] = [
    "com/github/loicoudot/java4cpp/Java4Cpp",
    "com/github/loicoudot/Java4Cpp",
];
const WRAP_MARKERS: [&str; 2] = [
    "com/github/loicoudot/java4cpp/Java4CppWrappe",
    "com/github/loicoudot/Java4CppWrappe",
];
const NO_WRAP_MARKERS: [&str; 2] = [
    "com/github/loicoudot/java4cpp/Java4CppNoWrappe",
    "com/github/loicoudot/Java4CppNoWrappe",
];

fn find<'a>(annotations: &'a [Annotation], markers: &[&str]) -> Option<&'a Annotation> {
    annotations.iter().find(|annotation| {
        annotation
            .type_internal_name()
            .is_some_and(|name| markers.contains(&name))
    })
}

/// Type-level `@Java4Cpp` attributes with their declared defaults applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// Proxy name override; `None` when absent or empty.
    pub name: Option<String>,
    pub superclass: bool,
    pub interfaces: bool,
    /// Dotted binary names.
    pub wrappe_interfaces: Vec<String>,
    /// Dotted binary names.
    pub no_wrappe_interfaces: Vec<String>,
    pub all: bool,
    pub static_fields: bool,
}

impl Default for TypeAnnotation {
    fn default() -> Self {
        Self {
            name: None,
            superclass: false,
            interfaces: false,
            wrappe_interfaces: Vec::new(),
            no_wrappe_interfaces: Vec::new(),
            all: true,
            static_fields: false,
        }
    }
}

impl TypeAnnotation {
    /// Returns `None` when no `@Java4Cpp` annotation is present.
    pub fn from_annotations(annotations: &[Annotation]) -> Option<Self> {
        let annotation = find(annotations, &TYPE_MARKERS)?;
        let defaults = Self::default();
        let flag = |name: &str, default: bool| {
            annotation
                .element(name)
                .and_then(|value| value.as_bool())
                .unwrap_or(default)
        };
        let classes = |name: &str| {
            annotation
                .element(name)
                .map(|value| {
                    value
                        .class_list()
                        .into_iter()
                        .map(internal_to_binary_name)
                        .collect()
                })
                .unwrap_or_default()
        };

        Some(Self {
            name: non_empty(annotation, "name"),
            superclass: flag("superclass", defaults.superclass),
            interfaces: flag("interfaces", defaults.interfaces),
            wrappe_interfaces: classes("wrappeInterfaces"),
            no_wrappe_interfaces: classes("noWrappeInterfaces"),
            all: flag("all", defaults.all),
            static_fields: flag("staticFields", defaults.static_fields),
        })
    }

    pub fn owner_flags(&self) -> OwnerFlags {
        OwnerFlags {
            all: self.all,
            static_fields: self.static_fields,
        }
    }
}

/// Member-level override markers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberMarkers {
    pub wrap: bool,
    /// `@Java4CppWrappe("...")` value; `None` when absent or empty.
    pub rename: Option<String>,
    pub no_wrap: bool,
}

impl MemberMarkers {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let wrap = find(annotations, &WRAP_MARKERS);
        Self {
            wrap: wrap.is_some(),
            rename: wrap.and_then(|annotation| non_empty(annotation, "value")),
            no_wrap: find(annotations, &NO_WRAP_MARKERS).is_some(),
        }
    }

    /// Markers for an inner type: `@Java4Cpp` on the inner class counts as a wrap marker and its
    /// `name` as the rename.
    pub fn for_inner_type(annotations: &[Annotation]) -> Self {
        let mut markers = Self::from_annotations(annotations);
        if let Some(annotation) = TypeAnnotation::from_annotations(annotations) {
            markers.wrap = true;
            if markers.rename.is_none() {
                markers.rename = annotation.name;
            }
        }
        markers
    }
}

fn non_empty(annotation: &Annotation, element: &str) -> Option<String> {
    annotation
        .element(element)
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
