//! Helpers shared by the handshake and the request executor.

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde_json::Value;
use url::Url;

use crate::error::{ClientError, HandleClientError, ProtocolError};

/// `Content-Type` sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Resolves `path` against the API root by concatenation.
///
/// Exactly one `/` separates the two, so `sessions/` and `/sessions/` both
/// resolve to `{base}/sessions/`. Unlike [`Url::join`], a first segment
/// containing `:` is never mistaken for a scheme.
///
/// ## Examples
///
/// ```rust
/// use handle_lib::transport::endpoint_url;
/// use url::Url;
///
/// let base = Url::parse("https://hs.example.org:8000/api").unwrap();
/// let url = endpoint_url(&base, "handles/0.NA/1234").unwrap();
/// assert_eq!(url.as_str(), "https://hs.example.org:8000/api/handles/0.NA/1234");
/// ```
pub fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, ClientError> {
    let joined = format!(
        "{}/{}",
        base_url.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ClientError::InvalidUrl(format!("{joined}: {e}")))
}

/// Converts a header string, rejecting characters not allowed on the wire.
pub(crate) fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader(e.to_string()))
}

/// Reads a response body as JSON.
pub(crate) async fn decode_body(
    response: reqwest::Response,
    url: &str,
) -> Result<Value, HandleClientError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ClientError::Request)?;
    decode_bytes(status, &bytes, url)
}

/// Decodes an already-read body.
///
/// Handle servers answer failures with a JSON body and a 4xx/5xx status, so
/// the status alone does not decide the outcome. A body that is not JSON is
/// a transport error on a failure status and a protocol error otherwise.
pub(crate) fn decode_bytes(
    status: StatusCode,
    bytes: &[u8],
    url: &str,
) -> Result<Value, HandleClientError> {
    match serde_json::from_slice(bytes) {
        Ok(body) => Ok(body),
        Err(source) if status.is_success() => Err(ProtocolError::MalformedBody {
            url: url.to_string(),
            source,
        }
        .into()),
        Err(_) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            let message = if text.is_empty() {
                status.to_string()
            } else {
                text
            };
            Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message,
            }
            .into())
        }
    }
}
