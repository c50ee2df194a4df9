//! API Double
//!
//! A mock server driven by an OpenAPI document, with reverse-proxy fallback.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────────────┐
//!                    │                      API DOUBLE                        │
//!                    │                                                        │
//!  Client Request    │  ┌─────────┐   ┌──────────┐   ┌─────────┐   ┌───────┐  │
//!  ──────────────────┼─▶│  http   │──▶│   auth   │──▶│ routing │──▶│ synth │  │
//!                    │  │ server  │   │  (mock)  │   │ matcher │   │       │  │
//!                    │  └─────────┘   └──────────┘   └────┬────┘   └───┬───┘  │
//!                    │                                    │ no match   │      │
//!                    │                                    ▼            ▼      │
//!  Client Response   │                              ┌──────────┐  pretty JSON │
//!  ◀─────────────────┼──────────────────────────────│  proxy   │◀─────────────┼──── Upstream
//!                    │                              │ fallback │              │
//!                    │                              └──────────┘              │
//!                    │  ┌──────────────────────────────────────────────────┐  │
//!                    │  │ config · spec loader · observability · lifecycle │  │
//!                    │  └──────────────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_double::config::{load_config, MockConfig, ServerMode};
use api_double::http::HttpServer;
use api_double::lifecycle::{load_spec, signals::spawn_signal_listener, Shutdown};
use api_double::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "api-double", version)]
#[command(about = "Serve synthesized responses for an OpenAPI document", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OpenAPI document (.json, .yaml, .yml)
    #[arg(short, long)]
    spec: Option<String>,

    /// Operating mode: mock or proxy
    #[arg(short, long)]
    mode: Option<ServerMode>,

    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base URL for proxy mode and fallback
    #[arg(short, long)]
    upstream: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut MockConfig) {
        if let Some(spec) = &self.spec {
            config.spec.path = spec.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = Some(upstream.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref(), |config| args.apply(config))?;

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-double starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = config.mode.label(),
        spec = %config.spec.path,
        base_path = ?config.base_path,
        upstream = ?config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let spec = load_spec(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, spec)?;
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
