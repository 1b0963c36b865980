use thiserror::Error;

/// A server response did not match the expected wire shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A required field was absent or had the wrong JSON type.
    #[error("response from {url} is missing field `{field}`")]
    MissingField { field: &'static str, url: String },

    /// The server nonce was not valid base64.
    #[error("server nonce is not valid base64: {0}")]
    InvalidNonce(#[from] base64::DecodeError),

    /// The response body was not JSON.
    #[error("response from {url} is not valid JSON: {source}")]
    MalformedBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
