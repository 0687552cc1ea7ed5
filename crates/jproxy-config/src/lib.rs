//! `jproxy.toml` loading, validation and tracing setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod diagnostics;
mod logging;
mod validation;

pub use diagnostics::{
    ConfigDiagnostics, ConfigValidationError, ConfigWarning, ValidationDiagnostics,
};
pub use logging::init_tracing;

/// Built-in native mappings: `java.lang.String` and the boxed primitives.
pub const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("java.lang.String", "std::string"),
    ("java.lang.Boolean", "bool"),
    ("java.lang.Byte", "int8_t"),
    ("java.lang.Character", "char16_t"),
    ("java.lang.Short", "int16_t"),
    ("java.lang.Integer", "int32_t"),
    ("java.lang.Long", "int64_t"),
    ("java.lang.Float", "float"),
    ("java.lang.Double", "double"),
];

/// Top-level `jproxy.toml`.
///
/// ```toml
/// [naming]
/// escape_suffix = "_"
/// reserved_words = ["assert"]
/// collision_scope = "plan"     # or "package", "enclosing"
///
/// [mappings]
/// "java.math.BigDecimal" = "std::string"
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JproxyConfig {
    #[serde(default)]
    pub naming: NamingConfig,

    /// Java binary name to native type, on top of [`BUILTIN_MAPPINGS`].
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JproxyConfig {
    /// Effective native mappings; entries in `[mappings]` override the built-ins.
    pub fn native_types(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        if self.naming.builtin_mappings {
            out.extend(
                BUILTIN_MAPPINGS
                    .iter()
                    .map(|(java, native)| ((*java).to_string(), (*native).to_string())),
            );
        }
        out.extend(self.mappings.clone());
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionScope {
    /// Proxy names are unique across the whole plan.
    #[default]
    Plan,
    /// Proxy names are unique within one Java package.
    Package,
    /// Nested types are unique within their enclosing type, top-level types across the plan.
    Enclosing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Appended to proxy names that clash with a reserved word.
    #[serde(default = "NamingConfig::default_escape_suffix")]
    pub escape_suffix: String,

    /// Extra reserved words on top of the C++ keywords.
    #[serde(default)]
    pub reserved_words: Vec<String>,

    #[serde(default)]
    pub collision_scope: CollisionScope,

    /// Include [`BUILTIN_MAPPINGS`] in the effective native mappings.
    #[serde(default = "NamingConfig::default_builtin_mappings")]
    pub builtin_mappings: bool,
}

impl NamingConfig {
    fn default_escape_suffix() -> String {
        "_".to_owned()
    }

    fn default_builtin_mappings() -> bool {
        true
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            escape_suffix: Self::default_escape_suffix(),
            reserved_words: Vec::new(),
            collision_scope: CollisionScope::default(),
            builtin_mappings: Self::default_builtin_mappings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to this file. If it cannot be opened, file logging is skipped.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub(crate) fn default_level() -> String {
        "warn".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// `level` as filter directives. Simple levels are lower-cased (`warning` becomes `warn`);
    /// anything else passes through as an `EnvFilter` directive string.
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return Self::default_level();
        }
        let lower = level.to_ascii_lowercase();
        match lower.as_str() {
            "warning" => "warn".to_owned(),
            "trace" | "debug" | "info" | "warn" | "error" | "off" => lower,
            _ => level.to_owned(),
        }
    }

    /// The effective filter. `RUST_LOG` is layered over the configured directives; the first
    /// candidate that parses wins, and the default level is the last resort.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let mut candidates = Vec::with_capacity(3);
        if let Some(env) = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
        {
            candidates.push(format!("{configured},{env}"));
            candidates.push(env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `Display` includes a source snippet; the message alone is enough.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl JproxyConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_config(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load a config file and report unknown keys and validation failures.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let text = read_config(path.as_ref())?;
        Self::load_from_str_with_diagnostics(&text)
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<JproxyConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.extend_validation(config.validate());

        Ok((config, diagnostics))
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub const JPROXY_CONFIG_ENV_VAR: &str = "JPROXY_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that set [`JPROXY_CONFIG_ENV_VAR`] wrap the mutation and the discovery in this helper so
/// concurrent discovery never observes a temporary override.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the configuration file for a project root.
///
/// Search order:
/// 1) `JPROXY_CONFIG_PATH` (absolute or relative to `root`)
/// 2) `jproxy.toml` in `root`
/// 3) `.jproxy.toml` in `root`
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(JPROXY_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["jproxy.toml", ".jproxy.toml"]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a project root with diagnostics.
///
/// If no config is present, returns [`JproxyConfig::default`], `None`, and empty diagnostics.
pub fn load_for_root_with_diagnostics(
    root: &Path,
) -> Result<(JproxyConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(root) else {
        return Ok((JproxyConfig::default(), None, ConfigDiagnostics::default()));
    };

    let (config, diagnostics) = JproxyConfig::load_from_path_with_diagnostics(&path)?;
    tracing::debug!(
        target: "jproxy.config",
        path = %path.display(),
        unknown_keys = diagnostics.unknown_keys.len(),
        "loaded config"
    );
    Ok((config, Some(path), diagnostics))
}
