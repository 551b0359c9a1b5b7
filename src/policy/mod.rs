//! Business-conduct policy search.
//!
//! Policy passages are retrieved by a catalog table function that performs
//! the semantic search server-side; this module only invokes it.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::config::{normalize_host, StoreIntelConfig};
use crate::error::StoreIntelError;
use crate::provider::http::{bearer_headers, read_json_body, shared_client};

/// Anything that can look up policy passages for a search phrase.
#[async_trait]
pub trait PolicySearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<serde_json::Value, StoreIntelError>;
}

static FUNCTION_NAME: OnceLock<Regex> = OnceLock::new();

fn function_name_pattern() -> &'static Regex {
    FUNCTION_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*){0,2}$")
            .expect("function name pattern is a valid regex")
    })
}

/// Runs `SELECT * FROM <function>(:search_query)` on a SQL warehouse.
#[derive(Clone)]
pub struct SqlFunctionPolicySearch {
    host: String,
    token: String,
    warehouse_id: String,
    function_name: String,
}

impl std::fmt::Debug for SqlFunctionPolicySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlFunctionPolicySearch")
            .field("host", &self.host)
            .field("warehouse_id", &self.warehouse_id)
            .field("function_name", &self.function_name)
            .finish_non_exhaustive()
    }
}

impl SqlFunctionPolicySearch {
    /// Rejects function names that are not plain dotted identifiers, since
    /// the name is spliced into the statement text.
    pub fn new(
        host: impl AsRef<str>,
        token: impl Into<String>,
        warehouse_id: impl Into<String>,
        function_name: impl Into<String>,
    ) -> Result<Self, StoreIntelError> {
        let function_name = function_name.into();
        if !function_name_pattern().is_match(&function_name) {
            return Err(StoreIntelError::Configuration(format!(
                "Invalid policy function name '{function_name}'"
            )));
        }
        Ok(Self {
            host: normalize_host(host.as_ref()),
            token: token.into(),
            warehouse_id: warehouse_id.into(),
            function_name,
        })
    }

    pub fn from_config(config: &StoreIntelConfig) -> Result<Self, StoreIntelError> {
        let (host, token) = config.credentials()?;
        let warehouse_id = config.warehouse_id().ok_or_else(|| {
            StoreIntelError::Configuration("Missing DATABRICKS_WAREHOUSE_ID".into())
        })?;
        let function_name = config.policy_function().ok_or_else(|| {
            StoreIntelError::Configuration("Missing POLICY_FUNCTION_NAME".into())
        })?;
        Self::new(host, token, warehouse_id, function_name)
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    fn statement(&self) -> String {
        format!("SELECT * FROM {}(:search_query)", self.function_name)
    }
}

#[derive(Deserialize)]
struct StatementResponse {
    #[serde(default)]
    statement_id: Option<String>,
    status: StatementStatus,
    #[serde(default)]
    manifest: Option<Manifest>,
    #[serde(default)]
    result: Option<StatementData>,
}

#[derive(Deserialize)]
struct StatementStatus {
    state: String,
    #[serde(default)]
    error: Option<StatementError>,
}

#[derive(Deserialize)]
struct StatementError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct Manifest {
    schema: ManifestSchema,
}

#[derive(Deserialize)]
struct ManifestSchema {
    #[serde(default)]
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct Column {
    name: String,
}

#[derive(Deserialize)]
struct StatementData {
    #[serde(default)]
    data_array: Option<Vec<Vec<serde_json::Value>>>,
}

#[async_trait]
impl PolicySearch for SqlFunctionPolicySearch {
    async fn search(&self, query: &str) -> Result<serde_json::Value, StoreIntelError> {
        if query.trim().is_empty() {
            return Err(StoreIntelError::InvalidArgument(
                "Policy search query must not be empty".into(),
            ));
        }

        let url = format!("{}/api/2.0/sql/statements", self.host);
        let body = serde_json::json!({
            "warehouse_id": self.warehouse_id,
            "statement": self.statement(),
            "parameters": [{ "name": "search_query", "value": query, "type": "STRING" }],
            "wait_timeout": "30s",
            "on_wait_timeout": "CANCEL",
            "format": "JSON_ARRAY",
            "disposition": "INLINE",
        });

        debug!(function = %self.function_name, "policy search");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.token))
            .json(&body)
            .send()
            .await?;
        let data: StatementResponse = serde_json::from_value(read_json_body(resp).await?)?;

        if data.status.state != "SUCCEEDED" {
            let message = data
                .status
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "statement did not finish".to_string());
            return Err(StoreIntelError::QueryFailed {
                status: data.status.state,
                message,
            });
        }

        let columns: Vec<String> = data
            .manifest
            .map(|m| m.schema.columns.into_iter().map(|c| c.name).collect())
            .unwrap_or_default();
        let rows = data.result.and_then(|r| r.data_array).unwrap_or_default();

        debug!(
            statement_id = data.statement_id.as_deref().unwrap_or(""),
            rows = rows.len(),
            "policy search finished"
        );

        Ok(serde_json::json!({ "columns": columns, "rows": rows }))
    }
}
