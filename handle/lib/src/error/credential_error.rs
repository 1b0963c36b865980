use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or using the administrator's private key.
///
/// These are always raised before any network call is made.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The key file could not be read.
    #[error("failed to read private key {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PEM content is not a supported RSA private key.
    #[error("failed to parse private key: {0}")]
    Parse(String),

    /// The key is encrypted but no passphrase was supplied.
    #[error("private key is encrypted and no passphrase was supplied")]
    PassphraseRequired,

    /// The passphrase did not decrypt the key.
    #[error("failed to decrypt private key (wrong passphrase?)")]
    Decrypt,

    /// The RSA signing operation failed.
    #[error("failed to sign handshake payload: {0}")]
    Sign(String),
}
