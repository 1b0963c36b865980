use thiserror::Error;

/// HTTP transport errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value contained characters not allowed on the wire.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// A non-success HTTP status carrying a body that is not a Handle response.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
}
