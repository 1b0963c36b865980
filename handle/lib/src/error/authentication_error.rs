use thiserror::Error;

/// The server answered the signed handshake with `authenticated: false`.
///
/// `message` is the server's own `error` text, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication failed: {message}")]
pub struct AuthenticationError {
    pub message: String,
}
