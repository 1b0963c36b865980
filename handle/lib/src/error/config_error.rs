use thiserror::Error;

/// Errors in the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting {0}")]
    MissingVar(&'static str),

    /// The server address is not a valid `host[:port]`.
    #[error("invalid server address `{0}`")]
    InvalidServer(String),

    /// A setting had a value that could not be parsed.
    #[error("invalid value `{value}` for {name}")]
    InvalidValue { name: &'static str, value: String },
}
