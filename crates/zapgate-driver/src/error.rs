use thiserror::Error;

/// Errors from the scanner API client.
///
/// Every transport, URL-building, or body-decoding problem lands here. The
/// driver treats all variants identically: the operation did not succeed.
/// Nothing in this crate lets an `ApiError` cross its public boundary; the
/// dispatcher and aggregator absorb it into boolean or best-effort outcomes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint path could not be combined into a valid URL
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP request failed in transit
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON
    #[error("invalid JSON in response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for API client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
