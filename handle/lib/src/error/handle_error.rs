use thiserror::Error;

/// A failure `responseCode` reported by the Handle server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (responseCode {response_code}) at {url}")]
pub struct HandleError {
    /// Numeric code from the response body.
    pub response_code: i64,
    /// Server message, known-code description, or `"Unexpected error"`.
    pub message: String,
    /// The handle the failure concerns, when the server names one.
    pub handle: Option<String>,
    /// The request URL that produced the failure.
    pub url: String,
}
