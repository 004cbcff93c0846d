//! Zentinel SOAP Gateway Agent binary.
//!
//! Run with: `zentinel-agent-soap-gateway --config config.yaml`
//!
//! Loads the gateway configuration, resolves the schema and operations, and
//! optionally dry-runs a directive through the loopback transport.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_agent_soap_gateway::{Directive, GatewayConfig, LoopbackTransport, SoapGateway};

/// REST-to-SOAP gateway agent for Zentinel proxy.
///
/// Binds configured SOAP operations to their schema types and translates
/// `INVOKE` directives into SOAP calls.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directive file (JSON) to dry-run through the loopback transport
    #[arg(short, long)]
    directive: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Zentinel SOAP Gateway Agent v{}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", args.config.display());

    let config = GatewayConfig::load(&args.config)
        .await
        .context("Failed to load config file")?;

    let gateway = SoapGateway::new(config, Arc::new(LoopbackTransport));
    let context = gateway.context();

    info!(
        service_type = %context.service_type,
        operations = ?context.operations.names(),
        types = context.types.len(),
        endpoint_valid = context.endpoint.is_valid(),
        "Gateway initialized"
    );

    let Some(directive_path) = args.directive else {
        return Ok(());
    };

    let content = tokio::fs::read_to_string(&directive_path)
        .await
        .context("Failed to read directive file")?;
    let directive: Directive =
        serde_json::from_str(&content).context("Failed to parse directive file")?;

    info!(name = %directive.name, "Dispatching directive through loopback transport");

    let output = match gateway.process_directive(directive).await {
        Ok(response) => serde_json::to_string_pretty(&response)?,
        Err(err) => serde_json::to_string_pretty(&err.to_envelope())?,
    };
    println!("{output}");

    Ok(())
}
