//! llm-relay binary
//!
//! Chat-completion gateway in front of an Ollama or OpenAI-compatible backend

use anyhow::Result;
use clap::Parser;
use llm_relay::gate::{start_server, GatewayConfig, GatewayState};
use llm_relay::{create_client, LlmConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// llm-relay: chat-completion gateway
#[derive(Parser, Debug)]
#[command(name = "llm-relay")]
#[command(about = "Chat-completion gateway for Ollama and OpenAI-compatible backends", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

/// Find a config file: explicit path, then ./llm-relay.toml, then ~/.llm-relay/config.toml
fn find_config_file(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = Path::new("./llm-relay.toml");
    if local.exists() {
        return Some(local.to_path_buf());
    }

    dirs::home_dir()
        .map(|home| home.join(".llm-relay").join("config.toml"))
        .filter(|path| path.exists())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config_file = find_config_file(args.config);

    match &config_file {
        Some(path) => tracing::info!("Loading config from: {}", path.display()),
        None => tracing::info!("No config file found, using environment only"),
    }

    let llm_config = LlmConfig::load(config_file.as_deref())?;
    let mut gateway_config = match &config_file {
        Some(path) => GatewayConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    // Override with CLI arguments
    if let Some(host) = args.host {
        gateway_config.host = host;
    }
    if let Some(port) = args.port {
        gateway_config.port = port;
    }

    // Configuration errors are fatal
    let provider_config = llm_config.provider_config()?;
    let defaults = llm_config.chat_defaults()?;

    if args.validate {
        println!("Configuration validation:");
        println!("  Listen: {}:{}", gateway_config.host, gateway_config.port);
        println!("  Provider: {}", provider_config.provider_type);
        println!("  Base URL: {}", provider_config.base_url());
        println!("  Model: {}", defaults.model.as_deref().unwrap_or("<backend default>"));
        println!("  max_tokens: {}", defaults.max_tokens);
        println!("  temperature: {}", defaults.temperature);
        println!("  top_p: {}", defaults.top_p);
        println!("\nConfiguration is valid");
        return Ok(());
    }

    tracing::info!(
        "Using {} backend at {}",
        provider_config.provider_type,
        provider_config.base_url()
    );

    let client = create_client(provider_config)?;
    let state = GatewayState::new(Arc::from(client), defaults);

    start_server(gateway_config, state).await
}
