//! Ollama Forwarding Proxy
//!
//! A local proxy that sits between a browser/client application and an Ollama
//! server, exposing the same REST surface with permissive CORS headers.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────────┐
//!                        │                  OLLAMA PROXY                      │
//!                        │                                                    │
//!   Client Request       │  ┌─────────┐    ┌─────────┐    ┌─────────────┐    │
//!   ─────────────────────┼─▶│   net   │───▶│  http   │───▶│   routing   │    │
//!                        │  │listener │    │ server  │    │  classify   │    │
//!                        │  └─────────┘    └─────────┘    └──────┬──────┘    │
//!                        │                                       │           │
//!                        │                 ┌─────────────────────┼────┐      │
//!                        │                 ▼                          ▼      │
//!                        │          ┌─────────────┐          ┌────────────┐  │
//!                        │          │  upstream   │          │ aggregate  │  │
//!                        │          │   relay     │          │  (ndjson)  │  │
//!                        │          └──────┬──────┘          └─────┬──────┘  │
//!   Client Response      │  ┌─────────┐    │                       │         │
//!   ◀────────────────────┼──│  cors   │◀───┴───────────────────────┘◀────────┼── Ollama
//!                        │  │ headers │                                      │
//!                        │  └─────────┘                                      │
//!                        │  config · observability · lifecycle               │
//!                        └───────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use ollama_proxy::config::{self, ConfigError, ProxyConfig};
use ollama_proxy::lifecycle::{shutdown_signal, Shutdown};
use ollama_proxy::observability;
use ollama_proxy::{net, HttpServer};

#[derive(Parser)]
#[command(name = "ollama-proxy")]
#[command(about = "CORS-friendly forwarding proxy for an Ollama server", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on [env: PROXY_PORT] [default: 8000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL [env: OLLAMA_URL] [default: http://localhost:11434]
    #[arg(short, long)]
    upstream: Option<String>,

    /// Log level when RUST_LOG is unset [env: PROXY_LOG_LEVEL] [default: info]
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Defaults < config file < environment < flags.
    fn resolve_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ProxyConfig::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = upstream.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        config::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    observability::logging::init(&config.observability);

    tracing::info!("ollama-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        upstream = %config.upstream.base_url,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees this parses.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            observability::metrics::init_metrics(addr);
        }
    }

    let listener = net::bind(&config.listener)?;
    tracing::info!(
        "Proxy listening on http://localhost:{}, forwarding to {}",
        listener.local_addr()?.port(),
        config.upstream.base_url
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
