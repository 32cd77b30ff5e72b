use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use nettools_core::config::parse_timeout_ms;
use nettools_core::{routes, ClientConfig, Endpoint, NetToolsClient};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nettools")]
#[command(about = "Client for the nettools IP/network calculation service")]
struct Cli {
    /// Base URL for every endpoint (overrides NETTOOLS_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (overrides NETTOOLS_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// POST /network/calculate
    CalculateNetwork(Payload),
    /// POST /ip/summary
    SummarizeIps(Payload),
    /// POST /ip/convert
    ConvertIp(Payload),
    /// POST /ip/format
    FormatIp(Payload),
    /// POST /network/divide
    DivideSubnet(Payload),
    /// POST /ip/location
    QueryIpLocation(Payload),
    /// POST /dns/query
    QueryDns(Payload),
    /// Resolve a UI path to its view
    Route { path: String },
    /// List endpoint paths
    Endpoints,
}

#[derive(Args, Debug)]
struct Payload {
    /// JSON object sent as the request body
    #[arg(long, default_value = "{}")]
    data: String,
}

impl Payload {
    fn parse(&self) -> Result<Value> {
        let value: Value = serde_json::from_str(&self.data).context("--data is not valid JSON")?;
        if !value.is_object() {
            bail!("--data must be a JSON object");
        }
        Ok(value)
    }
}

impl Command {
    fn endpoint(&self) -> Option<(Endpoint, &Payload)> {
        match self {
            Command::CalculateNetwork(p) => Some((Endpoint::CalculateNetwork, p)),
            Command::SummarizeIps(p) => Some((Endpoint::SummarizeIps, p)),
            Command::ConvertIp(p) => Some((Endpoint::ConvertIp, p)),
            Command::FormatIp(p) => Some((Endpoint::FormatIp, p)),
            Command::DivideSubnet(p) => Some((Endpoint::DivideSubnet, p)),
            Command::QueryIpLocation(p) => Some((Endpoint::QueryIpLocation, p)),
            Command::QueryDns(p) => Some((Endpoint::QueryDns, p)),
            Command::Route { .. } | Command::Endpoints => None,
        }
    }
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(raw) = &cli.timeout_ms {
        config.timeout = parse_timeout_ms(raw)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some((endpoint, payload)) = cli.command.endpoint() {
        return call(&cli, endpoint, payload).await;
    }
    match &cli.command {
        Command::Route { path } => Ok(print_route(path)),
        _ => {
            for endpoint in Endpoint::ALL {
                println!("{} {}", endpoint.method(), endpoint.path());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn call(cli: &Cli, endpoint: Endpoint, payload: &Payload) -> Result<ExitCode> {
    let payload = payload.parse()?;
    let config = client_config(cli)?;
    tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "client configured");

    let client = NetToolsClient::new(config);
    match client.call(endpoint, &payload).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        // Already reported through the notifier.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn print_route(path: &str) -> ExitCode {
    match routes::resolve(path) {
        Some(route) => {
            println!("{path} -> {} ({:?})", route.path, route.view);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("no route for {path}");
            ExitCode::FAILURE
        }
    }
}
