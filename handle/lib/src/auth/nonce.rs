use rand::RngCore;
use rand::rngs::OsRng;

/// Length of the client nonce in bytes.
pub const CLIENT_NONCE_LEN: usize = 16;

/// Client half of the handshake challenge.
///
/// Only constructible through [`ClientNonce::generate`], so every handshake
/// attempt draws a new value from the operating system's CSPRNG.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientNonce([u8; CLIENT_NONCE_LEN]);

impl ClientNonce {
    /// Draws a fresh nonce from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CLIENT_NONCE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CLIENT_NONCE_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for ClientNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientNonce(..)")
    }
}

/// The server's challenge together with the client's, for one handshake.
#[derive(Debug, Clone)]
pub struct NoncePair {
    pub server_nonce: Vec<u8>,
    pub client_nonce: ClientNonce,
}

impl NoncePair {
    /// Pairs a decoded server nonce with a freshly generated client nonce.
    pub fn new(server_nonce: Vec<u8>) -> Self {
        Self {
            server_nonce,
            client_nonce: ClientNonce::generate(),
        }
    }

    /// `server_nonce || client_nonce`, the bytes the credential signs.
    pub fn signed_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.server_nonce.len() + CLIENT_NONCE_LEN);
        payload.extend_from_slice(&self.server_nonce);
        payload.extend_from_slice(self.client_nonce.as_bytes());
        payload
    }
}
