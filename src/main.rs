//! Inertia demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser ──▶ request id ──▶ trace ──▶ inertia middleware ──▶ demo handlers
//!                                              │                      │
//!                                              │ version gate         │ PageBuilder
//!                                              ▼                      ▼
//!                                        409 + location        JSON | HTML (+ SSR)
//!
//!     config.toml ──▶ watcher ──▶ InertiaState::reload (ArcSwap)
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use inertia_server::config::{load_config, ConfigWatcher, InertiaConfig};
use inertia_server::http::{HttpServer, InertiaState, ShellView};
use inertia_server::lifecycle::{signals, Shutdown};
use inertia_server::observability::{logging, metrics};
use inertia_server::protocol::RequestInfo;
use inertia_server::{demo, SharedProps};

#[derive(Parser)]
#[command(name = "inertia-server")]
#[command(about = "Demo server for the Inertia protocol", long_about = None)]
struct Args {
    /// TOML configuration file, watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => InertiaConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("inertia-server v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        ssr_enabled = config.ssr.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let state = InertiaState::builder(config)
        .view(ShellView::new().title("Inertia Demo").script("/build/app.js"))
        .share(|request: &RequestInfo, shared: &mut SharedProps| {
            shared.share("appName", json!("Inertia Demo"));
            shared.share("path", json!(request.uri().path()));
        })
        .build()?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    // Dropping the watcher stops it; keep it for the life of the server.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let watcher = watcher.run()?;
            let state = state.clone();
            let mut stop = shutdown.subscribe();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        update = updates.recv() => match update {
                            Some(config) => {
                                if let Err(e) = state.reload(config) {
                                    tracing::error!(error = %e, "Rejected configuration update");
                                }
                            }
                            None => break,
                        },
                        _ = stop.recv() => break,
                    }
                }
            });
            Some(watcher)
        }
        None => None,
    };

    let server = HttpServer::new(demo::routes(), state);
    server.run(listener, shutdown).await?;

    Ok(())
}
