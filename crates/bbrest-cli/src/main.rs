//! bbrest - command line access to the Blackboard REST APIs.
//!
//! Authenticates with the credentials in a JSON config file and runs one
//! API call, printing the JSON response.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bbrest_core::api::DEFAULT_TIMEOUT_SECS;
use bbrest_core::config::DEFAULT_CONFIG_FILE;
use bbrest_core::logging::{self, LogConfig, LogDestination};
use bbrest_core::utils::{
    check_connection, pretty_print, time_format, DEFAULT_CONNECTION_HOST,
    DEFAULT_CONNECTION_TIMEOUT_SECS,
};
use bbrest_core::{AuthScheme, RequestOptions, Session};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bbrest", version, about = "Call the Blackboard REST APIs")]
struct Cli {
    /// Credential file with url, key, secret and optional client_id
    #[arg(long, env = "BBREST_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Auth scheme: learn, collab or ally
    #[arg(long, default_value = "learn")]
    scheme: AuthScheme,

    /// Write rotating log files here instead of stderr
    #[arg(long, env = "BBREST_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Keep the server's key order when printing
    #[arg(long)]
    unsorted: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Query parameter as key=value, repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

impl QueryArgs {
    fn pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET a collection, following every page
    Get {
        endpoint: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// POST a JSON payload
    Post {
        endpoint: String,
        payload: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// PUT a JSON payload (full replace)
    Put {
        endpoint: String,
        payload: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// PATCH a JSON payload (partial update)
    Patch {
        endpoint: String,
        payload: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// DELETE a record
    Delete {
        endpoint: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Upload a file to temporary storage and print its id
    Upload { file: PathBuf },
    /// Look up a course by external id
    Course {
        external_id: String,
        /// Field to return for the matching course
        #[arg(long, default_value = "id")]
        field: String,
    },
    /// Authenticate and print the bearer token
    Token,
    /// Convert DD/MM/YYYY[ HH:MM[:SS]] to the API date format
    Date {
        value: String,
        #[arg(long, default_value = "/")]
        date_delimiter: String,
        #[arg(long, default_value = ":")]
        hour_delimiter: String,
    },
    /// Check network connectivity
    Ping {
        #[arg(default_value = DEFAULT_CONNECTION_HOST)]
        host: String,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn parse_payload(payload: &str) -> Result<Value> {
    serde_json::from_str(payload).context("Payload is not valid JSON")
}

fn log_config(cli: &Cli) -> LogConfig {
    match &cli.log_dir {
        Some(dir) => LogConfig {
            level: cli.log_level.clone(),
            destination: LogDestination::Directory(dir.clone()),
            ..LogConfig::default()
        },
        None => LogConfig::stderr(cli.log_level.clone()),
    }
}

async fn connect(cli: &Cli) -> Result<Session> {
    let options = RequestOptions {
        timeout: Duration::from_secs(cli.timeout),
    };
    Session::quick_auth(&cli.config, cli.scheme, &options)
        .await
        .with_context(|| format!("Failed to authenticate using {}", cli.config.display()))
}

async fn run(cli: &Cli) -> Result<()> {
    let sort_keys = !cli.unsorted;

    match &cli.command {
        Command::Get { endpoint, query } => {
            let mut session = connect(cli).await?;
            let results = session.get(endpoint, &query.pairs()).await?;
            pretty_print(&Value::Array(results), sort_keys);
        }
        Command::Post {
            endpoint,
            payload,
            query,
        } => {
            let payload = parse_payload(payload)?;
            let mut session = connect(cli).await?;
            let created = session.post(endpoint, &payload, &query.pairs()).await?;
            pretty_print(&created, sort_keys);
        }
        Command::Put {
            endpoint,
            payload,
            query,
        } => {
            let payload = parse_payload(payload)?;
            let mut session = connect(cli).await?;
            let replaced = session.put(endpoint, &payload, &query.pairs()).await?;
            pretty_print(&replaced, sort_keys);
        }
        Command::Patch {
            endpoint,
            payload,
            query,
        } => {
            let payload = parse_payload(payload)?;
            let mut session = connect(cli).await?;
            let updated = session.patch(endpoint, &payload, &query.pairs()).await?;
            pretty_print(&updated, sort_keys);
        }
        Command::Delete { endpoint, query } => {
            let mut session = connect(cli).await?;
            session.delete(endpoint, &query.pairs()).await?;
            println!("Deleted {}", endpoint);
        }
        Command::Upload { file } => {
            let mut session = connect(cli).await?;
            let id = session.upload_file(file).await?;
            println!("{}", id);
        }
        Command::Course { external_id, field } => {
            let mut session = connect(cli).await?;
            match session.convert_external_id(external_id, field).await? {
                Some(value) => println!("{}", value),
                None => anyhow::bail!("No single course matches external id '{}'", external_id),
            }
        }
        Command::Token => {
            let mut session = connect(cli).await?;
            let token = session.token().await?;
            println!("{}", token.access_token);
        }
        Command::Date {
            value,
            date_delimiter,
            hour_delimiter,
        } => {
            println!("{}", time_format(value, date_delimiter, hour_delimiter)?);
        }
        Command::Ping { host } => {
            let timeout = Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS);
            if !check_connection(host, timeout).await {
                anyhow::bail!("No connection to {}", host);
            }
            println!("Connected to {}", host);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(&log_config(&cli))?;
    info!(command = ?cli.command, "bbrest starting");

    run(&cli).await
}
