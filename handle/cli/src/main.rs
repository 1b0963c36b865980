use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use handle_lib::config::{
    ADMIN_ID_VAR, INSECURE_VAR, PASSPHRASE_VAR, PRIVATE_KEY_VAR, SERVER_VAR, TIMEOUT_VAR,
};
use handle_lib::{ClientConfig, ConfigError, HandleClient, HandleClientError};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Administer records on a Handle server over its authenticated REST API.
///
/// Connection settings come from HANDLE_* environment variables (a .env file
/// is loaded if present) and can be overridden with flags.
///
/// Examples:
///   handle resolve 1234/abc
///   handle put handles/1234/abc @record.json
///   handle list 0.NA/1234
#[derive(Debug, Parser)]
#[command(name = "handle")]
#[command(version)]
#[command(about = "Administer records on a Handle server")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Server address as host:port [env: HANDLE_SERVER]
    #[arg(long, global = true, value_name = "HOST:PORT")]
    server: Option<String>,

    /// Administrator identity, e.g. 300:0.NA/1234 [env: HANDLE_ADMIN_ID]
    #[arg(long, global = true, value_name = "ID")]
    admin_id: Option<String>,

    /// PEM private key file [env: HANDLE_PRIVATE_KEY]
    #[arg(long, global = true, value_name = "PATH")]
    key: Option<PathBuf>,

    /// Passphrase for an encrypted key; prefer HANDLE_KEY_PASSPHRASE, as
    /// flags are visible in the process list and shell history
    #[arg(long, global = true, value_name = "SECRET")]
    passphrase: Option<String>,

    /// Request timeout in seconds [env: HANDLE_TIMEOUT_SECS]
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Skip TLS certificate verification (test servers only) [env: HANDLE_INSECURE]
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// GET a path under the API root
    Get { path: String },

    /// PUT a JSON body (inline or @file) to a path under the API root
    Put {
        path: String,
        #[arg(value_name = "JSON|@FILE")]
        body: String,
    },

    /// DELETE a path under the API root
    Delete { path: String },

    /// Resolve a handle record
    Resolve { handle: String },

    /// List the handles under a prefix
    List { prefix: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] HandleClientError),

    #[error("invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,handle_lib=info".to_string(),
            2 => "info,handle_lib=debug".to_string(),
            _ => "debug,handle_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

/// Builds the configuration, letting flags take precedence over the environment.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let flag = |name: &str| -> Option<String> {
        match name {
            SERVER_VAR => cli.server.clone(),
            ADMIN_ID_VAR => cli.admin_id.clone(),
            PRIVATE_KEY_VAR => cli.key.as_ref().map(|p| p.display().to_string()),
            PASSPHRASE_VAR => cli.passphrase.clone(),
            TIMEOUT_VAR => cli.timeout.map(|secs| secs.to_string()),
            INSECURE_VAR => cli.insecure.then(|| "true".to_string()),
            _ => None,
        }
    };

    ClientConfig::from_lookup(|name| flag(name).or_else(|| std::env::var(name).ok()))
}

/// Parses an inline JSON body, or reads it from a file when prefixed with `@`.
fn parse_body(raw: &str) -> Result<Value, CliError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        })?,
        None => raw.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

/// A subcommand with its input already validated.
#[derive(Debug)]
enum Operation {
    Get(String),
    Put(String, Value),
    Delete(String),
    Resolve(String),
    List(String),
}

impl TryFrom<&Command> for Operation {
    type Error = CliError;

    fn try_from(command: &Command) -> Result<Self, Self::Error> {
        Ok(match command {
            Command::Get { path } => Self::Get(path.clone()),
            Command::Put { path, body } => Self::Put(path.clone(), parse_body(body)?),
            Command::Delete { path } => Self::Delete(path.clone()),
            Command::Resolve { handle } => Self::Resolve(handle.clone()),
            Command::List { prefix } => Self::List(prefix.clone()),
        })
    }
}

/// Runs one operation, then closes the session whatever the outcome.
async fn execute(client: HandleClient, operation: &Operation) -> Result<Value, HandleClientError> {
    let result = match operation {
        Operation::Get(path) => client.get(path).await,
        Operation::Put(path, body) => client.put(path, body).await,
        Operation::Delete(path) => client.delete(path).await,
        Operation::Resolve(handle) => client.get_handle(handle).await,
        Operation::List(prefix) => client.list_handles(prefix).await,
    };

    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "failed to close session");
    }

    result
}

fn render(response: &Value) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string())
}

async fn run(cli: Cli) -> Result<Value, CliError> {
    // Input is validated before the handshake.
    let operation = Operation::try_from(&cli.command)?;

    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");

    let client = HandleClient::from_config(&config)?.connect().await?;
    Ok(execute(client, &operation).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match run(cli).await {
        Ok(response) => {
            println!("{}", render(&response));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handle_lib::{Credential, HandleError};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = include_str!("../../lib/tests/fixtures/admin_pkcs8.pem");
    const SESSION_HEADER: &str = r#"Handle sessionId="final-7""#;

    async fn connected(server: &MockServer) -> HandleClient {
        Mock::given(method("POST"))
            .and(path("/api/sessions/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sessionId": "provisional-1",
                "nonce": "MDEyMzQ1Njc4OWFiY2RlZg==",
            })))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/sessions/this"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sessionId": "final-7",
                "authenticated": true,
            })))
            .mount(server)
            .await;

        let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
        let credential = Credential::from_pem("300:0.NA/1234", KEY, None).unwrap();
        HandleClient::builder(url, credential)
            .connect()
            .await
            .unwrap()
    }

    async fn mount_close(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("DELETE"))
            .and(path("/api/sessions/this"))
            .and(header("authorization", SESSION_HEADER))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_execute_returns_response_and_closes_session() {
        let server = MockServer::start().await;
        let client = connected(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/handles/1234/abc"))
            .and(header("authorization", SESSION_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 1,
                "handle": "1234/abc",
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_close(&server, ResponseTemplate::new(204)).await;

        let response = execute(client, &Operation::Resolve("1234/abc".to_string()))
            .await
            .unwrap();
        assert_eq!(response["handle"], "1234/abc");
    }

    #[tokio::test]
    async fn test_execute_closes_session_after_handle_error() {
        let server = MockServer::start().await;
        let client = connected(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/handles/1234/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "responseCode": 100,
                "handle": "1234/missing",
            })))
            .mount(&server)
            .await;
        mount_close(&server, ResponseTemplate::new(204)).await;

        let result = execute(client, &Operation::Resolve("1234/missing".to_string())).await;

        match result {
            Err(HandleClientError::Handle(HandleError {
                response_code,
                message,
                ..
            })) => {
                assert_eq!(response_code, 100);
                assert_eq!(message, "Unexpected error");
            }
            other => panic!("expected HandleError, got {other:?}"),
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failed_close_keeps_operation_result() {
        let server = MockServer::start().await;
        let client = connected(&server).await;

        Mock::given(method("DELETE"))
            .and(path("/api/handles/1234/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 1,
                "handle": "1234/abc",
            })))
            .mount(&server)
            .await;
        mount_close(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

        let response = execute(client, &Operation::Delete("handles/1234/abc".to_string()))
            .await
            .unwrap();
        assert_eq!(response["responseCode"], 1);
        assert!(logs_contain("failed to close session"));
    }

    #[test]
    fn test_render_pretty_prints() {
        let response = json!({ "handle": "1234/abc", "responseCode": 1 });
        assert_eq!(
            render(&response),
            "{\n  \"handle\": \"1234/abc\",\n  \"responseCode\": 1\n}"
        );
    }

    #[test]
    fn test_parse_inline_body() {
        let body = parse_body(r#"{"values": []}"#).unwrap();
        assert_eq!(body["values"], serde_json::json!([]));
    }

    #[test]
    fn test_parse_file_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, r#"{"responseCode": 1}"#).unwrap();

        let body = parse_body(&format!("@{}", path.display())).unwrap();
        assert_eq!(body["responseCode"], 1);
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(parse_body("{nope"), Err(CliError::Body(_))));
        assert!(matches!(
            parse_body("@/nonexistent/record.json"),
            Err(CliError::Read { .. })
        ));
    }

    #[test]
    fn test_put_operation_parses_body() {
        let command = Command::Put {
            path: "handles/1234/abc".to_string(),
            body: r#"{"values": []}"#.to_string(),
        };
        assert!(matches!(
            Operation::try_from(&command),
            Ok(Operation::Put(path, _)) if path == "handles/1234/abc"
        ));
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "handle",
            "--server",
            "hs.example.org:8000",
            "--admin-id",
            "300:0.NA/1234",
            "--key",
            "/tmp/admpriv.pem",
            "--timeout",
            "7",
            "--insecure",
            "get",
            "handles/1234/abc",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.server, "hs.example.org:8000");
        assert_eq!(config.admin_id, "300:0.NA/1234");
        assert_eq!(config.private_key, PathBuf::from("/tmp/admpriv.pem"));
        assert_eq!(config.timeout.as_secs(), 7);
        assert!(config.accept_invalid_certs);
    }
}
