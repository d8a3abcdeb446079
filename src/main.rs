//! ==============================================================================
//! main.rs - garden host entry point
//! ==============================================================================
//!
//! purpose:
//!     starts the measurement service for the garden monitoring setup.
//!     sensors (or people with curl) push timestamped readings, the dashboard
//!     and scripts pull single records, whole days, or aggregate stats.
//!
//! responsibilities:
//!     - load configuration (garden.toml, then cli overrides)
//!     - initialize structured logging
//!     - build the in-memory store and optionally seed demo data
//!     - serve the http api until the process is stopped
//!
//! relationships:
//!     - uses: config.rs (settings), seed.rs (demo data), api.rs (router)
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────┐
//!     │                  garden host (this file)                  │
//!     │   ┌──────────────┐            ┌────────────────────────┐  │
//!     │   │  web server  │ ─────────> │ Arc<RwLock<Store>>     │  │
//!     │   │ (port 3000)  │  handlers  │ (measurements by key)  │  │
//!     │   └──────────────┘            └───────────┬────────────┘  │
//!     │                                           │ scans         │
//!     │                                   ┌───────┴───────┐       │
//!     │                                   │ stats (min /  │       │
//!     │                                   │ max / average)│       │
//!     │                                   └───────────────┘       │
//!     └──────────────────────────────────────────────────────────┘
//!
//! ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use garden_host::{api, config::ServiceConfig, seed, MeasurementStore};

#[derive(Parser, Debug)]
#[command(name = "garden-host", version, about = "Garden measurement service")]
struct Args {
    /// Path to garden.toml (searched in ./config and ../config when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides server.bind_addr
    #[arg(short, long)]
    bind: Option<String>,

    /// Start with an empty store
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // startup banner
    println!("===========================================================");
    println!("  Garden Host - Measurement Service");
    println!("===========================================================");

    // step 1: load configuration
    let mut config = match &args.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServiceConfig::load_or_default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if args.no_seed {
        config.seed.enabled = false;
    }
    config.print_summary();

    // step 2: logging (RUST_LOG wins over the config file)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // step 3: initialize shared state
    let mut store = MeasurementStore::new();
    if config.seed.enabled {
        seed::seed(&mut store);
    }
    let state = api::AppState::new(store);

    // step 4: serve
    let app = api::create_router(state, config.logging.log_requests);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;

    tracing::info!("API live at http://{}", config.server.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
