//! PDF Unlock Server
//!
//! Accepts an uploaded PDF and returns a copy with its encryption and
//! permission restrictions removed. Provides:
//!
//! - `POST /unlock-pdf` for the conversion itself
//! - `GET /health` for liveness checks
//! - Static assets from the public directory for every other path
//!
//! ## Architecture
//!
//! Uploads are streamed to a temp file, read back, and handed to
//! `pdfunlock-core` on the blocking pool. The temp file is removed once the
//! request finishes, successful or not.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod upload;

use api::{handle_health, handle_unlock_pdf};
use config::{AppConfig, DEFAULT_MAX_UPLOAD_MB};

/// Command-line arguments for the PDF unlock server
#[derive(Parser, Debug)]
#[command(name = "pdfunlock-server")]
#[command(about = "Removes encryption and permission restrictions from uploaded PDFs")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory of static assets
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,

    /// Directory for temporary uploads (created if missing)
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Maximum upload size in MiB
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            host: args.host,
            port: args.port,
            public_dir: args.public_dir,
            upload_dir: args.upload_dir,
            max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

/// Build the application router around a shared configuration
pub fn build_router(config: Arc<AppConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/unlock-pdf", post(handle_unlock_pdf))
        .layer(DefaultBodyLimit::max(config.body_limit()))
        // Everything else is a static asset
        .fallback_service(ServeDir::new(&config.public_dir))
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from(args);

    config.ensure_upload_dir().with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let addr = config.bind_addr()?;
    info!("Starting PDF unlock server on {}", addr);
    info!("Serving static files from {}", config.public_dir.display());
    info!(
        "Upload directory: {}, limit: {} bytes",
        config.upload_dir.display(),
        config.max_upload_bytes
    );

    let app = build_router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
