//! Starview claims dashboard server
//!
//! Serves the claims dashboard for one session:
//!
//! - `GET /` dashboard page (sidebar, satellite map, metrics, search)
//! - `GET /api/claims`, `GET /api/claims/:id`, `GET /api/history`
//! - `GET /api/report/stream?q=` typewriter report over Server-Sent Events
//! - `POST /api/report/export` PDF download of the finished report

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use claims_core::StaticReportResolver;
use dashboard_core::{DashboardConfig, DashboardController};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod page;
mod stream;
#[cfg(test)]
mod tests;

use api::{
    handle_claim, handle_export, handle_health, handle_history, handle_list_claims,
    handle_report_stream,
};

/// Command-line arguments for the claims dashboard server
#[derive(Parser, Debug)]
#[command(name = "claims-server")]
#[command(about = "Claims visualization dashboard with damage report export")]
struct Args {
    /// JSON configuration file; missing fields use the demo defaults
    #[arg(short, long, env = "CLAIMS_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "CLAIMS_PORT", default_value = "8501")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "CLAIMS_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory holding the before/after property images
    #[arg(long, env = "CLAIMS_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Seed for the claim scatter
    #[arg(long, env = "CLAIMS_SEED")]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn dashboard_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(dir) = &self.image_dir {
            config.image_dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.scatter.seed = seed;
        }
        Ok(config)
    }
}

pub type Dashboard = DashboardController<StaticReportResolver>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The single dashboard session served by this process
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Result<Self, dashboard_core::DashboardError> {
        let resolver = StaticReportResolver::new(config.image_dir.clone());
        let dashboard = DashboardController::new(config, resolver)?;
        Ok(Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(page::handle_index))
        .route("/health", get(handle_health))
        .route("/api/claims", get(handle_list_claims))
        .route("/api/claims/:id", get(handle_claim))
        .route("/api/history", get(handle_history))
        .route("/api/report/stream", get(handle_report_stream))
        .route("/api/report/export", post(handle_export))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.dashboard_config()?;
    info!(
        "Generating {} claims around {:.4}, {:.4} (seed {})",
        config.scatter.count,
        config.scatter.center.latitude,
        config.scatter.center.longitude,
        config.scatter.seed
    );
    info!("Images directory: {}", config.image_dir.display());

    let state = AppState::new(config)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
