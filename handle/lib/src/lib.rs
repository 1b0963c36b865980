//! Client library for the Handle REST API.
//!
//! Establishes an authenticated session with a Handle server using the
//! `HS_PUBKEY` challenge-response handshake, then issues authenticated
//! GET/PUT/DELETE requests, translating server-reported failures into typed
//! errors.
//!
//! ## Core Types
//!
//! - [`HandleClient`] - Connected client; performs the handshake once and
//!   executes requests
//! - [`Credential`] - Administrator identity and RSA signing key
//! - [`Session`] - Authenticated session issued by the server
//! - [`ClientConfig`] - Server address, identity and key location
//!
//! ## Handshake
//!
//! - [`session::Unauthenticated`] / [`session::NonceReceived`] - Explicit
//!   handshake states
//! - [`auth::build_handshake_header`] - `HS_PUBKEY` authorization header
//!
//! ## Responses
//!
//! - [`response::translate`] - `responseCode` to result translation
//! - [`HandleClientError`] - Tagged error variants for every failure kind

pub mod auth;
pub mod client;
pub mod config;
mod credential;
pub mod error;
mod method;
pub mod response;
pub mod session;
pub mod transport;

pub use client::{HandleClient, HandleClientBuilder};
pub use config::ClientConfig;
pub use credential::Credential;
pub use error::{
    AuthenticationError, ClientError, ConfigError, CredentialError, HandleClientError,
    HandleError, ProtocolError,
};
pub use method::RestMethod;
pub use session::Session;
