//! HTTP/JSON client for the scanner control API.
//!
//! All control calls are GET requests against
//! `http://{host}:{port}/JSON/{endpoint}?{params}` returning a JSON body.
//! The client maps every transport, URL, or decoding problem to [`ApiError`];
//! callers treat an `Err` and "JSON present but missing the expected field"
//! identically, so the field helpers here return `Option`.

use crate::error::{ApiError, ApiResult};
use serde_json::Value;
use url::Url;
use zapgate_core::{JobId, ScannerEndpoint};

/// Namespace prefix for JSON API endpoints on the scanner.
const API_PREFIX: &str = "/JSON/";

/// Client for one scanner's control API.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client bound to the given scanner endpoint.
    ///
    /// # Errors
    /// Returns error if the host/port do not form a valid base URL or the
    /// HTTP client cannot be constructed.
    pub fn new(endpoint: &ScannerEndpoint) -> ApiResult<Self> {
        // No per-request timeout: the poll loops own the wall-clock deadline.
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::Transport)?;
        let base = Url::parse(&format!(
            "http://{}:{}{}",
            endpoint.host, endpoint.port, API_PREFIX
        ))?;
        Ok(Self { http, base })
    }

    /// Call an API endpoint with URL-encoded query parameters.
    ///
    /// Parameter order carries no meaning to the scanner; pairs are encoded
    /// in the order given purely for log readability.
    pub async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        let mut api_url = self.base.join(endpoint)?;
        if !params.is_empty() {
            api_url
                .query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }

        tracing::trace!("GET {}", api_url);
        let body = self.http.get(api_url).send().await?.text().await?;
        let value = serde_json::from_str(&body)?;
        Ok(value)
    }
}

/// Whether an action response indicates success (`Result == "OK"`).
#[must_use]
pub fn result_is_ok(value: &Value) -> bool {
    value.get("Result").and_then(Value::as_str) == Some("OK")
}

/// Extract a job id field, tolerating number or numeric-string encodings.
///
/// The scanner emits `"scan": "3"` on some endpoints and `"scan": 3` on
/// others depending on version.
#[must_use]
pub fn job_id_field(value: &Value, field: &str) -> Option<JobId> {
    let raw = value.get(field)?;
    match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .map(JobId::new)
}

/// Extract the `status` percentage from a status response, clamped to 100.
///
/// Accepts number or numeric-string encodings like [`job_id_field`].
#[must_use]
pub fn status_field(value: &Value) -> Option<u8> {
    let raw = value.get("status")?;
    let status = match raw {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    Some(u8::try_from(status.min(100)).expect("clamped to 100"))
}
