//! Session establishment.
//!
//! The handshake is two round trips:
//!
//! 1. `POST /sessions/` returns a provisional `sessionId` and a base64 `nonce`.
//! 2. `PUT /sessions/this` carries a signature over `server nonce || client
//!    nonce`; the server answers with `authenticated` and the final
//!    `sessionId`.
//!
//! [`state`] holds the pure transitions between handshake phases and
//! [`establish_session`] drives them over HTTP.

mod handshake;
pub mod state;

pub use handshake::establish_session;

/// Opens a session and returns the server challenge.
pub(crate) const OPEN_SESSION_PATH: &str = "sessions/";
/// Addresses the caller's own session.
pub(crate) const THIS_SESSION_PATH: &str = "sessions/this";
pub use state::{HandshakePhase, NonceReceived, Unauthenticated};

/// A server-issued session obtained through a successful handshake.
///
/// Sessions are only created by [`NonceReceived::complete`], so every
/// `Session` outside this module is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    authenticated: bool,
}

impl Session {
    pub(crate) fn authenticated(session_id: String) -> Self {
        Self {
            session_id,
            authenticated: true,
        }
    }

    /// The final session id issued by the server.
    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
