//! Request execution with tracing instrumentation.
//!
//! This module provides [`HandleClient`], which performs the session
//! handshake once at construction and then issues authenticated requests,
//! routing every response through [`translate`].

use std::fmt;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use tracing::{Span, debug, instrument, warn};
use url::Url;

use crate::auth::build_session_header;
use crate::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::credential::Credential;
use crate::error::{AuthenticationError, ClientError, HandleClientError};
use crate::method::RestMethod;
use crate::response::translate;
use crate::session::{Session, THIS_SESSION_PATH, establish_session};
use crate::transport::{JSON_CONTENT_TYPE, decode_body, decode_bytes, endpoint_url, header_value};

/// Characters escaped in a handle when it is placed in a path. `/` and `:`
/// are part of handle syntax and stay literal.
const HANDLE_PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Builder for configuring a [`HandleClient`].
#[derive(Debug)]
pub struct HandleClientBuilder {
    base_url: Url,
    credential: Credential,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl HandleClientBuilder {
    fn new(base_url: Url, credential: Credential) -> Self {
        Self {
            base_url,
            credential,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    ///
    /// Off by default. Only for test servers with self-signed certificates;
    /// a warning is logged when a client is built with this enabled.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the HTTP client and runs the session handshake.
    ///
    /// ## Errors
    ///
    /// Any handshake failure. These are fatal: build a new client to retry.
    pub async fn connect(self) -> Result<HandleClient, HandleClientError> {
        if self.accept_invalid_certs {
            warn!(
                url = %self.base_url,
                "TLS certificate verification is disabled for this client"
            );
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(ClientError::Request)?;

        let session = establish_session(&http, &self.base_url, &self.credential).await?;
        let authorization = header_value(&build_session_header(session.id()))?;

        Ok(HandleClient {
            http,
            base_url: self.base_url,
            credential: self.credential,
            session,
            authorization,
        })
    }
}

/// Async client holding one authenticated session.
///
/// All state is fixed after [`HandleClientBuilder::connect`], so a single
/// client can be shared (e.g. behind an `Arc`) by concurrent callers. The
/// session is never renewed; if the server expires it, requests fail with
/// [`HandleClientError::Handle`] and a new client must be connected.
///
/// ## Examples
///
/// ```rust,ignore
/// use handle_lib::{Credential, HandleClient};
/// use url::Url;
///
/// let credential = Credential::from_pem_file("300:0.NA/1234", "admpriv.pem", None)?;
/// let base_url = Url::parse("https://hs.example.org:8000/api")?;
/// let client = HandleClient::builder(base_url, credential).connect().await?;
///
/// let record = client.get_handle("1234/abc").await?;
/// println!("{record}");
/// ```
pub struct HandleClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Credential,
    session: Session,
    authorization: HeaderValue,
}

impl HandleClient {
    /// Creates a builder for a client at `base_url` (the `/api` root).
    pub fn builder(base_url: Url, credential: Credential) -> HandleClientBuilder {
        HandleClientBuilder::new(base_url, credential)
    }

    /// Creates a builder from a [`ClientConfig`], loading the private key.
    ///
    /// ## Errors
    ///
    /// [`HandleClientError::Config`] for a bad server address or
    /// [`HandleClientError::Credential`] if the key cannot be loaded.
    pub fn from_config(config: &ClientConfig) -> Result<HandleClientBuilder, HandleClientError> {
        let base_url = config.base_url()?;
        let credential = config.load_credential()?;
        Ok(Self::builder(base_url, credential)
            .timeout(config.timeout)
            .accept_invalid_certs(config.accept_invalid_certs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The administrator identity this client authenticated as.
    pub fn identity(&self) -> &str {
        self.credential.identity()
    }

    /// `GET {base}/{path}`.
    pub async fn get(&self, path: &str) -> Result<Value, HandleClientError> {
        self.execute(RestMethod::Get, path, None).await
    }

    /// `PUT {base}/{path}` with `body` as the JSON payload.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, HandleClientError> {
        self.execute(RestMethod::Put, path, Some(body)).await
    }

    /// `DELETE {base}/{path}`.
    pub async fn delete(&self, path: &str) -> Result<Value, HandleClientError> {
        self.execute(RestMethod::Delete, path, None).await
    }

    /// Resolves a handle record.
    pub async fn get_handle(&self, handle: &str) -> Result<Value, HandleClientError> {
        self.get(&handle_path(handle)).await
    }

    /// Creates or replaces a handle record.
    pub async fn put_handle(
        &self,
        handle: &str,
        record: &Value,
    ) -> Result<Value, HandleClientError> {
        self.put(&handle_path(handle), record).await
    }

    /// Deletes a handle record.
    pub async fn delete_handle(&self, handle: &str) -> Result<Value, HandleClientError> {
        self.delete(&handle_path(handle)).await
    }

    /// Lists the handles under `prefix`.
    pub async fn list_handles(&self, prefix: &str) -> Result<Value, HandleClientError> {
        let path = format!(
            "handles?prefix={}",
            utf8_percent_encode(prefix, QUERY_ENCODE_SET)
        );
        self.get(&path).await
    }

    /// Ends the session on the server.
    ///
    /// Consumes the client so the closed session cannot be used again. An
    /// empty success response is accepted; otherwise the body is translated
    /// like any other response.
    #[instrument(name = "handle_close_session", skip(self))]
    pub async fn close(self) -> Result<(), HandleClientError> {
        let url = endpoint_url(&self.base_url, THIS_SESSION_PATH)?;
        let response = self
            .http
            .request(RestMethod::Delete.to_reqwest(), url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .await
            .map_err(ClientError::Request)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::Request)?;
        if status.is_success() && bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("session closed");
            return Ok(());
        }

        translate(url.as_str(), decode_bytes(status, &bytes, url.as_str())?)?;
        debug!("session closed");
        Ok(())
    }

    /// Sends one authenticated request and translates the response.
    #[instrument(
        name = "handle_request",
        skip(self, body),
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            handle.response_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn execute(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, HandleClientError> {
        if !self.session.is_authenticated() {
            return Err(AuthenticationError {
                message: "session is not authenticated".to_string(),
            }
            .into());
        }

        let url = endpoint_url(&self.base_url, path)?;
        Span::current().record("http.url", url.as_str());

        let mut request = self
            .http
            .request(method.to_reqwest(), url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, self.authorization.clone());

        if let Some(body) = body.filter(|_| method.has_body()) {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(ClientError::Request)?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        let body = decode_body(response, url.as_str()).await?;
        if let Some(code) = body.get("responseCode").and_then(Value::as_i64) {
            Span::current().record("handle.response_code", code);
        }

        let result = translate(url.as_str(), body);
        let otel_status = if result.is_ok() { "OK" } else { "ERROR" };
        Span::current().record("otel.status_code", otel_status);

        result
    }
}

impl fmt::Debug for HandleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleClient")
            .field("base_url", &self.base_url.as_str())
            .field("identity", &self.credential.identity())
            .finish_non_exhaustive()
    }
}

fn handle_path(handle: &str) -> String {
    format!(
        "handles/{}",
        utf8_percent_encode(handle.trim_start_matches('/'), HANDLE_PATH_ENCODE_SET)
    )
}
