use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{JproxyConfig, LoggingConfig};

impl JproxyConfig {
    /// Validate semantic invariants, reporting as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_naming(self, &mut out);
        validate_mappings(self, &mut out);
        validate_logging(self, &mut out);

        out
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_java_binary_name(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

fn validate_naming(config: &JproxyConfig, out: &mut ValidationDiagnostics) {
    let suffix = &config.naming.escape_suffix;
    if suffix.is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "naming.escape_suffix".to_string(),
            message: "must not be empty".to_string(),
        });
    } else if !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "naming.escape_suffix".to_string(),
            message: format!("`{suffix}` must only contain ASCII letters, digits and `_`"),
        });
    }

    for (idx, word) in config.naming.reserved_words.iter().enumerate() {
        if !is_identifier(word) {
            out.warnings.push(ConfigWarning::InvalidValue {
                toml_path: format!("naming.reserved_words[{idx}]"),
                message: format!("`{word}` is not an identifier and can never match a proxy name"),
            });
        }
    }
}

fn validate_mappings(config: &JproxyConfig, out: &mut ValidationDiagnostics) {
    for (java, native) in &config.mappings {
        let toml_path = format!("mappings.\"{java}\"");
        if !is_java_binary_name(java) {
            out.warnings.push(ConfigWarning::InvalidValue {
                toml_path: toml_path.clone(),
                message: "expected a dotted Java binary name such as `java.lang.String`"
                    .to_string(),
            });
        }
        if native.trim().is_empty() {
            out.errors.push(ConfigValidationError::InvalidValue {
                toml_path,
                message: "native type must not be empty".to_string(),
            });
        }
    }
}

fn validate_logging(config: &JproxyConfig, out: &mut ValidationDiagnostics) {
    let normalized = config.logging.directives();
    if tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err() {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
            fallback: LoggingConfig::default_level(),
        });
    }
}
