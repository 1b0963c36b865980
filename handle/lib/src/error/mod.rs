//! Layered error types for the handle client.
//!
//! Each failure kind is its own type so callers can pattern-match on the
//! variant instead of inspecting a field:
//! - [`HandleClientError`] - Top-level error type for all client operations
//! - [`CredentialError`] - Private key loading and signing failures
//! - [`AuthenticationError`] - The server rejected the session handshake
//! - [`ProtocolError`] - A response did not have the expected shape
//! - [`HandleError`] - The server reported a non-success `responseCode`
//! - [`ClientError`] - HTTP transport failures
//! - [`ConfigError`] - Missing or invalid client configuration

mod authentication_error;
mod client_error;
mod config_error;
mod credential_error;
mod handle_client_error;
mod handle_error;
mod protocol_error;

pub use authentication_error::AuthenticationError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use credential_error::CredentialError;
pub use handle_client_error::HandleClientError;
pub use handle_error::HandleError;
pub use protocol_error::ProtocolError;
