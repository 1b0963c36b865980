//! Handshake phases as explicit states.
//!
//! Each transition consumes the previous state and inspects one decoded
//! response body, so every failure point can be exercised without a server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use strum::Display;

use super::Session;
use crate::auth::{NoncePair, build_handshake_header};
use crate::credential::Credential;
use crate::error::{AuthenticationError, HandleClientError, ProtocolError};

/// Reported when the server rejects a handshake without an `error` text.
const REJECTED_WITHOUT_REASON: &str = "server rejected the session handshake";

/// Coarse progress of a handshake, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HandshakePhase {
    /// Nothing exchanged yet.
    Unauthenticated,
    /// Provisional session and server nonce received.
    NonceReceived,
    /// Server accepted the signed proof.
    Authenticated,
}

/// Start of a handshake.
#[derive(Debug, Default)]
pub struct Unauthenticated;

impl Unauthenticated {
    pub fn new() -> Self {
        Self
    }

    pub fn phase(&self) -> HandshakePhase {
        HandshakePhase::Unauthenticated
    }

    /// Accepts the `POST /sessions/` body and generates the client nonce.
    ///
    /// ## Errors
    ///
    /// [`ProtocolError`] if `nonce` or `sessionId` is missing, not a string,
    /// or the nonce is not base64.
    pub fn receive_challenge(
        self,
        url: &str,
        body: &Value,
    ) -> Result<NonceReceived, HandleClientError> {
        let nonce = required_str(body, "nonce", url)?;
        let session_id = required_str(body, "sessionId", url)?;
        let server_nonce = STANDARD
            .decode(nonce.trim())
            .map_err(ProtocolError::InvalidNonce)?;

        Ok(NonceReceived {
            provisional_session_id: session_id.to_string(),
            nonces: NoncePair::new(server_nonce),
        })
    }
}

/// The server has issued its challenge; the client can now prove its identity.
#[derive(Debug)]
pub struct NonceReceived {
    provisional_session_id: String,
    nonces: NoncePair,
}

impl NonceReceived {
    pub fn phase(&self) -> HandshakePhase {
        HandshakePhase::NonceReceived
    }

    pub fn provisional_session_id(&self) -> &str {
        &self.provisional_session_id
    }

    pub fn nonces(&self) -> &NoncePair {
        &self.nonces
    }

    /// Signs the nonce pair and builds the `HS_PUBKEY` authorization header.
    ///
    /// ## Errors
    ///
    /// [`HandleClientError::Credential`] if signing fails.
    pub fn authorization(&self, credential: &Credential) -> Result<String, HandleClientError> {
        let signature = credential.sign(&self.nonces.signed_payload())?;
        Ok(build_handshake_header(
            &self.provisional_session_id,
            credential.identity(),
            self.nonces.client_nonce.as_bytes(),
            &signature,
        ))
    }

    /// Accepts the `PUT /sessions/this` body.
    ///
    /// ## Errors
    ///
    /// - [`AuthenticationError`] if `authenticated` is `false`
    /// - [`ProtocolError`] if `authenticated` or the final `sessionId` is missing
    pub fn complete(self, url: &str, body: &Value) -> Result<Session, HandleClientError> {
        let authenticated = body
            .get("authenticated")
            .and_then(Value::as_bool)
            .ok_or_else(|| ProtocolError::MissingField {
                field: "authenticated",
                url: url.to_string(),
            })?;

        if !authenticated {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(REJECTED_WITHOUT_REASON)
                .to_string();
            return Err(AuthenticationError { message }.into());
        }

        let session_id = required_str(body, "sessionId", url)?;
        Ok(Session::authenticated(session_id.to_string()))
    }
}

fn required_str<'a>(
    body: &'a Value,
    field: &'static str,
    url: &str,
) -> Result<&'a str, ProtocolError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::MissingField {
            field,
            url: url.to_string(),
        })
}
