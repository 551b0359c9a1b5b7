//! Tests for configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;

use store_intel::config::StoreIntelConfig;
use store_intel::error::StoreIntelError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 9] = [
    "DATABRICKS_HOST",
    "DATABRICKS_TOKEN",
    "DATABRICKS_MODEL",
    "GENIE_SPACE_STORE_PERFORMANCE_ID",
    "GENIE_SPACE_PRODUCT_INV_ID",
    "POLICY_FUNCTION_NAME",
    "DATABRICKS_WAREHOUSE_ID",
    "GENIE_POLL_INTERVAL_SECS",
    "GENIE_TIMEOUT_SECS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

const SAMPLE_FILE: &str = r#"
host = "adb-123.azuredatabricks.net/"
model = "databricks-claude-sonnet"
catalog = "main"
schema = "sgfs"

[spaces]
store_performance = "file-perf"
product_inventory = "file-inv"

[policy]
warehouse_id = "wh-file"

[genie]
poll_interval_secs = 1.5
timeout_secs = 30
"#;

#[test]
fn file_values_load_with_derived_policy_function() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_FILE.as_bytes()).unwrap();

    let config = StoreIntelConfig::from_file(file.path()).unwrap();

    assert_eq!(config.host(), Some("https://adb-123.azuredatabricks.net"));
    assert_eq!(config.model(), Some("databricks-claude-sonnet"));
    assert_eq!(config.spaces().store_performance.as_deref(), Some("file-perf"));
    assert_eq!(config.warehouse_id(), Some("wh-file"));
    assert_eq!(
        config.policy_function().as_deref(),
        Some("main.sgfs.retail_club_conduct")
    );
    assert_eq!(config.poll_policy().interval, Duration::from_millis(1500));
    assert_eq!(config.poll_policy().timeout, Duration::from_secs(30));
}

#[test]
fn load_overlays_environment_on_file() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_config.toml");
    std::fs::write(&path, SAMPLE_FILE).unwrap();

    std::env::set_var("DATABRICKS_TOKEN", "env-token");
    std::env::set_var("GENIE_SPACE_STORE_PERFORMANCE_ID", "env-perf");
    std::env::set_var("GENIE_TIMEOUT_SECS", "90");

    let config = StoreIntelConfig::load(Some(&path)).unwrap();

    assert_eq!(config.token(), Some("env-token"));
    assert_eq!(config.spaces().store_performance.as_deref(), Some("env-perf"));
    assert_eq!(config.spaces().product_inventory.as_deref(), Some("file-inv"));
    assert_eq!(config.poll_policy().timeout, Duration::from_secs(90));
    config.validate().unwrap();
}

#[test]
fn missing_file_falls_back_to_environment() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("DATABRICKS_HOST", "http://127.0.0.1:9999/");
    let dir = tempfile::tempdir().unwrap();

    let config = StoreIntelConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.host(), Some("http://127.0.0.1:9999"));
    assert!(matches!(
        config.validate(),
        Err(StoreIntelError::Configuration(msg)) if msg.contains("DATABRICKS_TOKEN")
    ));
}

#[test]
fn malformed_numbers_are_configuration_errors() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("GENIE_POLL_INTERVAL_SECS", "soon");
    let err = StoreIntelConfig::load(None).unwrap_err();
    assert!(matches!(err, StoreIntelError::Configuration(msg) if msg.contains("GENIE_POLL_INTERVAL_SECS")));
}

#[test]
fn invalid_toml_is_configuration_error() {
    let err = StoreIntelConfig::from_toml_str("host = ").unwrap_err();
    assert!(matches!(err, StoreIntelError::Configuration(_)));
}

#[test]
fn debug_output_redacts_token() {
    let config = StoreIntelConfig::new().with_token("dapi-secret");
    let debug = format!("{config:?}");
    assert!(!debug.contains("dapi-secret"));
    assert!(debug.contains("<redacted>"));
}
