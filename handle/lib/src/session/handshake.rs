use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{Span, debug, info, instrument};
use url::Url;

use super::{OPEN_SESSION_PATH, Session, THIS_SESSION_PATH};
use super::state::{HandshakePhase, Unauthenticated};
use crate::credential::Credential;
use crate::error::{ClientError, HandleClientError};
use crate::method::RestMethod;
use crate::transport::{JSON_CONTENT_TYPE, decode_body, endpoint_url, header_value};

/// Runs the two-round `HS_PUBKEY` handshake and returns the authenticated session.
///
/// A rejection is final: the caller gets the [`AuthenticationError`] and
/// nothing is retried.
///
/// ## Errors
///
/// - [`HandleClientError::Protocol`] if either response is malformed
/// - [`HandleClientError::Credential`] if signing fails
/// - [`HandleClientError::Authentication`] if the server rejects the proof
/// - [`HandleClientError::Client`] on transport failures
///
/// [`AuthenticationError`]: crate::error::AuthenticationError
#[instrument(
    name = "handle_handshake",
    skip(http, base_url, credential),
    fields(
        handle.admin = credential.identity(),
        handle.phase = tracing::field::Empty,
    )
)]
pub async fn establish_session(
    http: &reqwest::Client,
    base_url: &Url,
    credential: &Credential,
) -> Result<Session, HandleClientError> {
    let state = Unauthenticated::new();
    Span::current().record("handle.phase", state.phase().to_string().as_str());

    let open_url = endpoint_url(base_url, OPEN_SESSION_PATH)?;
    debug!(url = %open_url, "requesting session challenge");
    let response = http
        .request(RestMethod::Post.to_reqwest(), open_url.clone())
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .send()
        .await
        .map_err(ClientError::Request)?;
    let body = decode_body(response, open_url.as_str()).await?;

    let state = state.receive_challenge(open_url.as_str(), &body)?;
    Span::current().record("handle.phase", state.phase().to_string().as_str());
    debug!(
        server_nonce_len = state.nonces().server_nonce.len(),
        "received server nonce"
    );

    let authorization = header_value(&state.authorization(credential)?)?;

    let this_url = endpoint_url(base_url, THIS_SESSION_PATH)?;
    let response = http
        .request(RestMethod::Put.to_reqwest(), this_url.clone())
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(AUTHORIZATION, authorization)
        .send()
        .await
        .map_err(ClientError::Request)?;
    let body = decode_body(response, this_url.as_str()).await?;

    let session = state.complete(this_url.as_str(), &body)?;
    Span::current().record(
        "handle.phase",
        HandshakePhase::Authenticated.to_string().as_str(),
    );
    info!("session authenticated");

    Ok(session)
}
