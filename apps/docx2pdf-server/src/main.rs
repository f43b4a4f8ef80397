//! docx2pdf server
//!
//! A small HTTP service that converts uploaded office documents to PDF by
//! shelling out to LibreOffice. Endpoints:
//!
//! - `GET /health` - liveness probe
//! - `POST /convert` - authenticated conversion, returns the PDF bytes
//!
//! Uploads are staged under per-request UUID names in a working directory
//! and removed before the request ends, on success and failure alike.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use convert_engine::LibreOffice;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod files;

use api::{handle_convert, handle_health};

/// Command-line arguments for the docx2pdf server
#[derive(Parser, Debug)]
#[command(name = "docx2pdf-server")]
#[command(about = "HTTP API converting uploaded documents to PDF via LibreOffice")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory for transient input/output files
    #[arg(long, env = "WORK_DIR", default_value = "/tmp/docx2pdf")]
    work_dir: PathBuf,

    /// Conversion timeout in milliseconds
    #[arg(long, env = "CONVERT_TIMEOUT_MS", default_value = "30000")]
    timeout_ms: u64,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    max_upload_bytes: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Shared-secret API token; `None` means every presented token mismatches
    pub secret: Option<String>,
    /// Directory holding per-request working files
    pub work_dir: PathBuf,
    /// Handle to the external converter
    pub converter: Arc<LibreOffice>,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
}

/// Build the application router
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Headroom over the document cap for multipart framing.
    let body_limit = state.max_upload_bytes + 64 * 1024;

    Router::new()
        .route("/health", get(handle_health))
        .route("/convert", post(handle_convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

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

    let secret = std::env::var("API_TOKEN").ok();
    if secret.is_none() {
        warn!("API_TOKEN is not set; every /convert request will be rejected");
    }

    std::fs::create_dir_all(&args.work_dir)?;

    let state = AppState {
        secret,
        work_dir: args.work_dir.clone(),
        converter: Arc::new(LibreOffice::from_env(args.timeout_ms)),
        max_upload_bytes: args.max_upload_bytes,
    };

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Working directory: {}", args.work_dir.display());
    info!("Conversion timeout: {}ms", args.timeout_ms);
    info!("Upload limit: {} bytes", args.max_upload_bytes);

    axum::serve(listener, app).await?;

    Ok(())
}
