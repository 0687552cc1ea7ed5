use jproxy_config::{init_tracing, LoggingConfig};
use jproxy_test_utils::{env_lock, EnvVarGuard};

#[test]
fn env_filter_accepts_levels_and_directives() {
    let _lock = env_lock();
    let _env = EnvVarGuard::unset("RUST_LOG");

    for level in ["debug", "WARNING", "", "jproxy.plan=trace,info"] {
        let config = LoggingConfig {
            level: level.to_string(),
            ..LoggingConfig::default()
        };
        let rendered = config.env_filter().to_string();
        assert!(!rendered.is_empty(), "{level:?}");
    }
}

#[test]
fn invalid_level_falls_back_to_the_default_level() {
    let _lock = env_lock();
    let _env = EnvVarGuard::unset("RUST_LOG");

    let config = LoggingConfig {
        level: "info,jproxy=loud".to_string(),
        ..LoggingConfig::default()
    };
    assert_eq!(config.env_filter().to_string(), "warn");
    assert_eq!(LoggingConfig::default().directives(), "warn");
}

#[test]
fn rust_log_is_merged() {
    let _lock = env_lock();
    let _env = EnvVarGuard::set("RUST_LOG", "jproxy.classpath=trace");

    let filter = LoggingConfig::default().env_filter().to_string();
    assert!(filter.contains("jproxy.classpath=trace"), "{filter}");
}

#[test]
fn init_tracing_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        stderr: false,
        file: Some(dir.path().join("jproxy.log")),
        ..LoggingConfig::default()
    };
    init_tracing(&config);
    init_tracing(&config);
    tracing::warn!(target: "jproxy.config", "logged once");
}
