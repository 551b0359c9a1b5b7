//! Shared HTTP client and auth utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::StoreIntelError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> StoreIntelError {
    match status {
        401 | 403 => StoreIntelError::Authentication(error_message(body)),
        429 => StoreIntelError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => StoreIntelError::api(status, error_message(body)),
    }
}

/// Read a response body, turning non-2xx statuses into errors.
pub async fn read_json_body(resp: reqwest::Response) -> Result<serde_json::Value, StoreIntelError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(status_to_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Pull a readable message out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error").and_then(|e| e.get("message")))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_to_error_reads_databricks_message() {
        let err = status_to_error(
            404,
            r#"{"error_code":"RESOURCE_DOES_NOT_EXIST","message":"Space not found"}"#,
        );
        assert!(matches!(err, StoreIntelError::Api { status: 404, ref message } if message == "Space not found"));
    }

    #[test]
    fn status_to_error_maps_auth_and_rate_limit() {
        assert!(matches!(status_to_error(403, "nope"), StoreIntelError::Authentication(_)));
        assert!(matches!(
            status_to_error(429, r#"{"error":{"retry_after":1.5}}"#),
            StoreIntelError::RateLimited { retry_after_ms: Some(1500) }
        ));
    }
}
