//! Proxy identifier escaping and native type mapping.

use std::collections::{BTreeMap, BTreeSet};

use crate::TypeKey;

/// Name-mapping collaborator.
///
/// [`escape`](NameMapping::escape) is called exactly once per chosen proxy name; its output is
/// used verbatim.
pub trait NameMapping {
    fn escape(&self, source: &str) -> String;

    /// Native type standing in for `key`, if the type is not proxied.
    fn native_type(&self, _key: &TypeKey) -> Option<&str> {
        None
    }
}

/// C++ keywords and alternative tokens.
pub const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

pub const DEFAULT_ESCAPE_SUFFIX: &str = "_";

#[derive(Clone, Debug)]
pub struct CppNameMapping {
    reserved: BTreeSet<String>,
    suffix: String,
    native_types: BTreeMap<String, String>,
}

impl Default for CppNameMapping {
    fn default() -> Self {
        Self {
            reserved: CPP_KEYWORDS.iter().map(|kw| (*kw).to_string()).collect(),
            suffix: DEFAULT_ESCAPE_SUFFIX.to_string(),
            native_types: BTreeMap::new(),
        }
    }
}

impl CppNameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Adds words on top of the C++ keywords.
    pub fn with_reserved_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(words.into_iter().map(Into::into));
        self
    }

    /// Maps the Java type `binary_name` (any arity) to `native`.
    pub fn with_native_type(
        mut self,
        binary_name: impl Into<String>,
        native: impl Into<String>,
    ) -> Self {
        self.native_types.insert(binary_name.into(), native.into());
        self
    }
}

impl NameMapping for CppNameMapping {
    fn escape(&self, source: &str) -> String {
        // `$` is legal in Java identifiers but not portable C++.
        let mut name: String = source
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        // Local classes (`Outer$1Local`) have simple names starting with a digit.
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        if self.reserved.contains(&name) {
            name.push_str(&self.suffix);
        }
        name
    }

    fn native_type(&self, key: &TypeKey) -> Option<&str> {
        self.native_types.get(key.name()).map(String::as_str)
    }
}
