//! WeddingCard Server
//!
//! REST backend storing wedding records, accounts, RSVPs and guestbook
//! messages in SQLite.
//!
//! # Configuration
//!
//! Environment variables:
//! - `WEDDINGCARD_PORT`: Port to listen on (default: 8080)
//! - `WEDDINGCARD_DATABASE_PATH`: SQLite database (default: ~/.local/share/weddingcard/weddingcard.db)
//! - `WEDDINGCARD_CONFIG`: Path to config file (default: ~/.config/weddingcard/config.yaml)
//! - `RUST_LOG`: Log filter (default: `weddingcard_server=info,weddingcard=info,tower_http=info`)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `GET|PUT /wedding`: Owner's record (owner session required)
//! - `GET /wedding/share/{shareable_id}`, `GET /wedding/public/{id}`: Public record
//! - `POST /auth/register`, `POST /auth/login`, `GET /profile`
//! - `POST /rsvp`, `GET /rsvp/{wedding_id}`, `GET /rsvp/shareable/{shareable_id}`
//! - `POST /guestbook`, `GET /guestbook/{wedding_id}`, `GET /guestbook/shareable/{shareable_id}`
//!
//! All endpoints are also served under `/api`.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weddingcard::config::Config;
use weddingcard::db::init_db;
use weddingcard::server::{router, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "weddingcard_server=info,weddingcard=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config_path = std::env::var("WEDDINGCARD_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    tracing::info!("Database: {}", config.database_path.value.display());
    let pool = init_db(&config.database_path.value).await?;

    let app = router(AppState::new(pool));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
