//! Handshake authentication primitives.
//!
//! - [`ClientNonce`] - Fresh 16-byte client challenge
//! - [`NoncePair`] - Server and client nonces and the payload they sign
//! - [`build_handshake_header`] / [`build_session_header`] - `Authorization`
//!   header values in the `Handle` scheme

mod header;
mod nonce;

pub use header::{build_handshake_header, build_session_header};
pub use nonce::{CLIENT_NONCE_LEN, ClientNonce, NoncePair};
