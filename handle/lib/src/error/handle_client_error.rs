use thiserror::Error;

use super::{
    AuthenticationError, ClientError, ConfigError, CredentialError, HandleError, ProtocolError,
};

/// Top-level error for every fallible client operation.
///
/// `Credential`, `Authentication` and `Protocol` failures raised while
/// connecting are fatal for the client instance. `Handle` failures are scoped
/// to the single request that produced them.
#[derive(Debug, Error)]
pub enum HandleClientError {
    /// The private key could not be loaded or used for signing.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The server refused the signed handshake.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// A response body was missing required fields or was not JSON.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server reported a failure `responseCode` for a request.
    #[error(transparent)]
    Handle(#[from] HandleError),

    /// The HTTP transport failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Client configuration was incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HandleClientError {
    /// Returns the server-reported failure, if this is one.
    pub fn as_handle_error(&self) -> Option<&HandleError> {
        match self {
            Self::Handle(err) => Some(err),
            _ => None,
        }
    }
}
