//! Configuration system (layered: explicit setters > env > config file).
//!
//! The configuration is a plain value built once at start-up and handed to
//! the clients that need it; nothing in the library reads the environment
//! on its own.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::StoreIntelError;
use crate::genie::PollPolicy;

/// Default config file name looked up by the binary.
pub const DEFAULT_CONFIG_FILE: &str = "app_config.toml";

/// Policy function used when neither the file nor env name one.
const DEFAULT_POLICY_FUNCTION: &str = "retail_club_conduct";

/// Genie space identifiers, one per information domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpaceIds {
    pub store_performance: Option<String>,
    pub product_inventory: Option<String>,
}

/// Where the business-conduct policy search runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PolicySettings {
    /// Fully qualified catalog function, e.g. `main.sgfs.retail_club_conduct`.
    pub function_name: Option<String>,
    /// SQL warehouse that executes the function.
    pub warehouse_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenieFileSettings {
    poll_interval_secs: Option<f64>,
    timeout_secs: Option<f64>,
}

/// On-disk layout of `app_config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    model: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    #[serde(default)]
    spaces: SpaceIds,
    #[serde(default)]
    policy: PolicySettings,
    #[serde(default)]
    genie: GenieFileSettings,
}

/// Resolved configuration for the assistant.
#[derive(Clone, Default)]
pub struct StoreIntelConfig {
    host: Option<String>,
    token: Option<String>,
    model: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    spaces: SpaceIds,
    policy: PolicySettings,
    poll: PollPolicy,
}

impl fmt::Debug for StoreIntelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreIntelConfig")
            .field("host", &self.host)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("spaces", &self.spaces)
            .field("policy", &self.policy)
            .field("poll", &self.poll)
            .finish()
    }
}

impl StoreIntelConfig {
    /// Create an empty config with default polling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document in the `app_config.toml` layout.
    pub fn from_toml_str(raw: &str) -> Result<Self, StoreIntelError> {
        let file: FileConfig = toml::from_str(raw)
            .map_err(|e| StoreIntelError::Configuration(format!("Invalid config file: {e}")))?;

        let mut config = Self::new();
        config.host = file.host.map(|h| normalize_host(&h));
        config.model = file.model;
        config.catalog = file.catalog;
        config.schema = file.schema;
        config.spaces = file.spaces;
        config.policy = file.policy;
        if let Some(secs) = file.genie.poll_interval_secs {
            config.poll.interval = secs_to_duration("genie.poll_interval_secs", secs)?;
        }
        if let Some(secs) = file.genie.timeout_secs {
            config.poll.timeout = secs_to_duration("genie.timeout_secs", secs)?;
        }
        Ok(config)
    }

    /// Read a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreIntelError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Load from environment variables only (`.env` is honoured if present).
    pub fn from_env() -> Result<Self, StoreIntelError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load the optional config file, then overlay the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, StoreIntelError> {
        let _ = dotenvy::dotenv();
        let mut config = match path {
            Some(p) if p.exists() => {
                tracing::debug!(path = %p.display(), "loading config file");
                Self::from_file(p)?
            }
            Some(p) => {
                tracing::debug!(path = %p.display(), "config file not found, using env only");
                Self::new()
            }
            None => Self::new(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment-style lookup.
    ///
    /// Values found here replace anything loaded from a file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), StoreIntelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("DATABRICKS_HOST") {
            self.host = Some(normalize_host(&host));
        }
        if let Some(token) = get("DATABRICKS_TOKEN") {
            self.token = Some(token);
        }
        if let Some(model) = get("DATABRICKS_MODEL") {
            self.model = Some(model);
        }
        if let Some(id) = get("GENIE_SPACE_STORE_PERFORMANCE_ID") {
            self.spaces.store_performance = Some(id);
        }
        if let Some(id) = get("GENIE_SPACE_PRODUCT_INV_ID") {
            self.spaces.product_inventory = Some(id);
        }
        if let Some(name) = get("POLICY_FUNCTION_NAME") {
            self.policy.function_name = Some(name);
        }
        if let Some(id) = get("DATABRICKS_WAREHOUSE_ID") {
            self.policy.warehouse_id = Some(id);
        }
        if let Some(raw) = get("GENIE_POLL_INTERVAL_SECS") {
            self.poll.interval = parse_secs("GENIE_POLL_INTERVAL_SECS", &raw)?;
        }
        if let Some(raw) = get("GENIE_TIMEOUT_SECS") {
            self.poll.timeout = parse_secs("GENIE_TIMEOUT_SECS", &raw)?;
        }
        Ok(())
    }

    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.host = Some(normalize_host(host.as_ref()));
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_spaces(mut self, spaces: SpaceIds) -> Self {
        self.spaces = spaces;
        self
    }

    pub fn with_policy(mut self, policy: PolicySettings) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Workspace host, always with a scheme and without a trailing slash.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn spaces(&self) -> &SpaceIds {
        &self.spaces
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn warehouse_id(&self) -> Option<&str> {
        self.policy.warehouse_id.as_deref()
    }

    /// Policy function name; falls back to `<catalog>.<schema>.retail_club_conduct`
    /// when only catalog and schema are configured.
    pub fn policy_function(&self) -> Option<String> {
        if let Some(name) = &self.policy.function_name {
            return Some(name.clone());
        }
        match (&self.catalog, &self.schema) {
            (Some(catalog), Some(schema)) => {
                Some(format!("{catalog}.{schema}.{DEFAULT_POLICY_FUNCTION}"))
            }
            _ => None,
        }
    }

    /// Host and token, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str), StoreIntelError> {
        let host = self
            .host()
            .ok_or_else(|| StoreIntelError::Configuration("Missing DATABRICKS_HOST".into()))?;
        let token = self
            .token()
            .ok_or_else(|| StoreIntelError::Configuration("Missing DATABRICKS_TOKEN".into()))?;
        Ok((host, token))
    }

    /// Check the settings every entry point needs.
    pub fn validate(&self) -> Result<(), StoreIntelError> {
        self.credentials()?;
        if self.poll.interval.is_zero() {
            return Err(StoreIntelError::Configuration(
                "Genie poll interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Ensure the host carries a scheme and has no trailing slash.
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, StoreIntelError> {
    let secs: f64 = raw.trim().parse().map_err(|_| {
        StoreIntelError::Configuration(format!("{key} must be a number of seconds, got '{raw}'"))
    })?;
    secs_to_duration(key, secs)
}

fn secs_to_duration(key: &str, secs: f64) -> Result<Duration, StoreIntelError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(StoreIntelError::Configuration(format!(
            "{key} must be a non-negative number of seconds"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}
