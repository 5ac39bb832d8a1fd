//! zonedesk command line entry point
//!
//! Loads the configuration, builds the router context and dispatches a
//! single request through the router chain. The JSON answer goes to stdout,
//! logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zonedesk_backend::available_modules;
use zonedesk_core::{
    build_context, error_payload, Configuration, MainRouter, Method, Request, RequestRouter,
};

#[derive(Parser)]
#[command(name = "zonedesk")]
#[command(about = "Manage DNS zones across configured backends", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "zonedesk.toml")]
    config: PathBuf,

    /// Log in as this user before dispatching
    #[arg(short, long, requires = "password")]
    user: Option<String>,

    /// Password for --user
    #[arg(short, long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one request, e.g. `call GET servers/main/zones`
    Call {
        /// GET, POST, PUT or DELETE
        method: String,
        /// Request path
        path: String,
        /// Request parameter as key=value (value may be JSON)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Request parameters as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
    /// List backend modules and their options
    Modules,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Configuration::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.internal.debug);

    match run(cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr; `log` records from the library crates are bridged in.
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

async fn run(cli: Cli, config: &Configuration) -> anyhow::Result<ExitCode> {
    let (method, path, params, data) = match cli.command {
        Commands::Modules => {
            println!("{}", serde_json::to_string_pretty(&available_modules())?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Call {
            method,
            path,
            params,
            data,
        } => (method, path, params, data),
    };

    let method: Method = method.parse()?;
    let mut request = Request::new(method, &path).with_params(parse_params(&params, data)?);

    let context = build_context(config)
        .await
        .context("Failed to initialise backends")?;
    let router = MainRouter::new(Arc::new(context));

    if let (Some(user), Some(password)) = (cli.user, cli.password) {
        let mut login = Request::post("status")
            .with_param("username", user.as_str())
            .with_param("password", password);
        let status = router.track(&mut login).await?;
        if status["loggedIn"] != Value::Bool(true) {
            bail!("Login as {user} failed");
        }
    }

    tracing::debug!("Dispatching {method} {path}");
    match router.track(&mut request).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if e.is_expected() {
                tracing::warn!("{method} {path}: {e}");
            } else {
                tracing::error!("{method} {path}: {e}");
            }
            println!("{}", serde_json::to_string_pretty(&error_payload(&e))?);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Merge `--data` and `--param key=value` pairs; later pairs win.
fn parse_params(pairs: &[String], data: Option<String>) -> anyhow::Result<Map<String, Value>> {
    let mut params = match data {
        None => Map::new(),
        Some(raw) => match serde_json::from_str(&raw).context("--data is not valid JSON")? {
            Value::Object(map) => map,
            _ => bail!("--data must be a JSON object"),
        },
    };

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{pair}'"))?;
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Object(_) | Value::Array(_))) => v,
            _ => Value::String(raw.to_string()),
        };
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
