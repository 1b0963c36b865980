//! `Authorization` header values for the `Handle` scheme.
//!
//! The server matches these strings exactly: field names, order, quoting and
//! the `", "` separators are all part of the wire format.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is in the `id` field. `/` stays literal so
/// `300:0.NA/1234` encodes as `300%3A0.NA/1234`.
const IDENTITY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Header for `PUT /sessions/this`, proving possession of the admin key.
///
/// ## Examples
///
/// ```rust
/// use handle_lib::auth::build_handshake_header;
///
/// let header = build_handshake_header("abc123", "300:0.NA/1234", &[0u8; 16], b"sig");
/// assert!(header.starts_with(r#"Handle sessionId="abc123", id="300%3A0.NA/1234""#));
/// ```
pub fn build_handshake_header(
    session_id: &str,
    identity: &str,
    client_nonce: &[u8],
    signature: &[u8],
) -> String {
    format!(
        r#"Handle sessionId="{session_id}", id="{id}", type="HS_PUBKEY", cnonce="{cnonce}", alg="SHA256", signature="{signature}""#,
        id = utf8_percent_encode(identity, IDENTITY_ENCODE_SET),
        cnonce = single_line_base64(client_nonce),
        signature = single_line_base64(signature),
    )
}

/// Header carried by every request after the handshake.
pub fn build_session_header(session_id: &str) -> String {
    format!(r#"Handle sessionId="{session_id}""#)
}

fn single_line_base64(bytes: &[u8]) -> String {
    let mut encoded = STANDARD.encode(bytes);
    encoded.retain(|c| c != '\n' && c != '\r');
    encoded
}
