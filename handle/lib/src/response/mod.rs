//! Translation of decoded Handle server responses into results.
//!
//! Every response body carries an integer `responseCode`; `1` is success and
//! anything else becomes a [`HandleError`].

mod codes;

use serde_json::Value;

use crate::error::{HandleClientError, HandleError, ProtocolError};

pub use codes::{KNOWN_RESPONSE_CODES, SUCCESS, describe};

/// Message used when neither the body nor the known-code table explains a failure.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Passes a successful body through unchanged, or converts a failure code
/// into a [`HandleError`].
///
/// The failure message is the body's `message` field when present, else the
/// description of the code in [`KNOWN_RESPONSE_CODES`], else
/// [`UNEXPECTED_ERROR`].
///
/// ## Errors
///
/// - [`HandleClientError::Handle`] for any `responseCode` other than `1`
/// - [`HandleClientError::Protocol`] if the body has no integer `responseCode`
///
/// ## Examples
///
/// ```rust
/// use handle_lib::response::translate;
/// use serde_json::json;
///
/// let body = json!({ "responseCode": 1, "handle": "1234/abc" });
/// assert_eq!(translate("https://hs/api/handles/1234/abc", body.clone()).unwrap(), body);
/// ```
pub fn translate(url: &str, body: Value) -> Result<Value, HandleClientError> {
    let response_code = body
        .get("responseCode")
        .and_then(Value::as_i64)
        .ok_or_else(|| ProtocolError::MissingField {
            field: "responseCode",
            url: url.to_string(),
        })?;

    if response_code == SUCCESS {
        return Ok(body);
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| describe(response_code).map(str::to_string))
        .unwrap_or_else(|| UNEXPECTED_ERROR.to_string());

    let handle = body
        .get("handle")
        .and_then(Value::as_str)
        .map(str::to_string);

    Err(HandleError {
        response_code,
        message,
        handle,
        url: url.to_string(),
    }
    .into())
}
