//! HTTP API for the WeddingCard server.
//!
//! Every route is served both at the root and under `/api`.

mod auth;
mod error;
mod guestbook;
mod rsvp;
mod wedding;

pub use error::ApiError;

use axum::{
    routing::{get, post},
    Json, Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use weddingcard_core::api::HealthResponse;

use crate::db::{GuestbookRepository, RsvpRepository, User, UserRepository, WeddingRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub weddings: WeddingRepository,
    pub users: UserRepository,
    pub rsvps: RsvpRepository,
    pub guestbook: GuestbookRepository,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            weddings: WeddingRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            rsvps: RsvpRepository::new(pool.clone()),
            guestbook: GuestbookRepository::new(pool),
        }
    }

    /// Resolves an owner session to its user.
    pub async fn authenticate(&self, session: &str) -> Result<User, ApiError> {
        let session = session.trim();
        if session.is_empty() {
            return Err(ApiError::unauthorized("Owner session required"));
        }

        self.users
            .find_by_session(session)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unknown or expired session"))
    }
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/wedding",
            get(wedding::get_owner_wedding).put(wedding::upsert_wedding),
        )
        .route("/wedding/share/{shareable_id}", get(wedding::get_shared_wedding))
        .route("/wedding/public/{id}", get(wedding::get_legacy_wedding))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/profile", get(auth::profile))
        .route("/rsvp", post(rsvp::submit))
        .route("/rsvp/{wedding_id}", get(rsvp::list_by_id))
        .route("/rsvp/shareable/{shareable_id}", get(rsvp::list_by_shareable_id))
        .route("/guestbook", post(guestbook::submit))
        .route("/guestbook/{wedding_id}", get(guestbook::list_by_id))
        .route(
            "/guestbook/shareable/{shareable_id}",
            get(guestbook::list_by_shareable_id),
        )
}

/// Builds the full router with tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, send};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let (app, _state, _temp) = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_routes_mounted_under_api() {
        let (app, _state, _temp) = app().await;
        let (status, _) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
