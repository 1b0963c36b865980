//! Client configuration.
//!
//! Values come from the environment (see the `*_VAR` constants) and can be
//! overridden field by field by the caller, e.g. from CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::credential::Credential;
use crate::error::{ConfigError, CredentialError};

pub const SERVER_VAR: &str = "HANDLE_SERVER";
pub const ADMIN_ID_VAR: &str = "HANDLE_ADMIN_ID";
pub const PRIVATE_KEY_VAR: &str = "HANDLE_PRIVATE_KEY";
pub const PASSPHRASE_VAR: &str = "HANDLE_KEY_PASSPHRASE";
pub const INSECURE_VAR: &str = "HANDLE_INSECURE";
pub const TIMEOUT_VAR: &str = "HANDLE_TIMEOUT_SECS";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything needed to connect to a Handle server as an administrator.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server address as `host[:port]`.
    pub server: String,
    /// Administrator identity, e.g. `300:0.NA/1234`.
    pub admin_id: String,
    /// Path to the PEM-encoded RSA private key.
    pub private_key: PathBuf,
    /// Passphrase for an encrypted key.
    pub passphrase: Option<String>,
    /// Skip TLS certificate verification. Test environments only.
    pub accept_invalid_certs: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with certificate verification on and the
    /// default timeout.
    pub fn new(
        server: impl Into<String>,
        admin_id: impl Into<String>,
        private_key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            server: server.into(),
            admin_id: admin_id.into(),
            private_key: private_key.into(),
            passphrase: None,
            accept_invalid_certs: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the configuration from process environment variables.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError::MissingVar`] if a required variable is unset or empty
    /// - [`ConfigError::InvalidValue`] if `HANDLE_INSECURE` or
    ///   `HANDLE_TIMEOUT_SECS` cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));

        let mut config = Self::new(
            require(SERVER_VAR)?,
            require(ADMIN_ID_VAR)?,
            require(PRIVATE_KEY_VAR)?,
        );
        config.passphrase = get(PASSPHRASE_VAR);

        if let Some(value) = get(INSECURE_VAR) {
            config.accept_invalid_certs = parse_flag(INSECURE_VAR, &value)?;
        }
        if let Some(value) = get(TIMEOUT_VAR) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: TIMEOUT_VAR,
                    value: value.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// The API root, `https://<server>/api`.
    ///
    /// ## Errors
    ///
    /// [`ConfigError::InvalidServer`] unless `server` is a bare `host[:port]`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let server = self.server.trim();
        let invalid = || ConfigError::InvalidServer(self.server.clone());

        if server.is_empty() || server.contains("://") || server.contains('/') {
            return Err(invalid());
        }

        let url = Url::parse(&format!("https://{server}/api")).map_err(|_| invalid())?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid());
        }
        Ok(url)
    }

    /// Loads the administrator's key.
    pub fn load_credential(&self) -> Result<Credential, CredentialError> {
        Credential::from_pem_file(
            self.admin_id.clone(),
            &self.private_key,
            self.passphrase.as_deref(),
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("admin_id", &self.admin_id)
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (SERVER_VAR, "hs.example.org:8000"),
        (ADMIN_ID_VAR, "300:0.NA/1234"),
        (PRIVATE_KEY_VAR, "/etc/handle/admpriv.pem"),
    ];

    #[test]
    fn test_from_lookup_defaults() {
        let config = ClientConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.server, "hs.example.org:8000");
        assert_eq!(config.admin_id, "300:0.NA/1234");
        assert_eq!(config.private_key, PathBuf::from("/etc/handle/admpriv.pem"));
        assert_eq!(config.passphrase, None);
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_from_lookup_optional_values() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (PASSPHRASE_VAR, "secret"),
            (INSECURE_VAR, "true"),
            (TIMEOUT_VAR, "5"),
        ]);
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.passphrase.as_deref(), Some("secret"));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let result = ClientConfig::from_lookup(lookup(&REQUIRED[..2]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingVar(PRIVATE_KEY_VAR))
        ));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = (SERVER_VAR, "  ");
        let result = ClientConfig::from_lookup(lookup(&vars));
        assert!(matches!(result, Err(ConfigError::MissingVar(SERVER_VAR))));
    }

    #[test]
    fn test_invalid_flag() {
        let mut vars = REQUIRED.to_vec();
        vars.push((INSECURE_VAR, "maybe"));
        let result = ClientConfig::from_lookup(lookup(&vars));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: INSECURE_VAR,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push((TIMEOUT_VAR, "soon"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_base_url() {
        let config = ClientConfig::new("hs.example.org:8000", "id", "key.pem");
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://hs.example.org:8000/api"
        );
    }

    #[test]
    fn test_base_url_rejects_scheme_and_path() {
        for server in ["https://hs.example.org", "hs.example.org/api", "", "host:notaport"] {
            let config = ClientConfig::new(server, "id", "key.pem");
            assert!(
                matches!(config.base_url(), Err(ConfigError::InvalidServer(_))),
                "accepted {server:?}"
            );
        }
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let mut config = ClientConfig::new("hs.example.org", "id", "key.pem");
        config.passphrase = Some("hunter2".to_string());
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
