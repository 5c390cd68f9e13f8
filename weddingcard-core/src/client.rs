//! HTTP client for the WeddingCard server.
//!
//! [`HttpStore`] implements [`RecordStore`] against the REST contract:
//!
//! - `GET  /wedding?owner=<session>`
//! - `PUT  /wedding` (body: owner + patch fields)
//! - `GET  /wedding/share/<shareable_id>`
//! - `GET  /wedding/public/<id>`
//!
//! A 404 maps to "not found"; every other failure, including transport
//! errors, maps to [`StoreError::Unavailable`].

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::api::{
    AuthResponse, Credentials, ErrorBody, GuestbookList, GuestbookSubmitted, HealthResponse,
    ProfileResponse, RsvpList, RsvpSubmitted, UpsertRequest,
};
use crate::models::{NewGuestbookEntry, NewRsvp, WeddingPatch, WeddingRecord};
use crate::store::{RecordStore, StoreError, StoreResult};

/// Timeout for the reachability probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors from non-store client calls (auth, guest submissions).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach server: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response from server: {0}")]
    Decode(String),
}

/// Record store backed by the WeddingCard REST API.
///
/// The `owner` passed to store methods is the owner's session id.
#[derive(Debug, Clone)]
pub struct HttpStore {
    server_url: String,
    http: reqwest::Client,
}

impl HttpStore {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Joins `path` onto the server URL, defaulting to http for bare hosts.
    pub fn build_url(&self, path: &str) -> String {
        let base_url = if self.server_url.starts_with("http://")
            || self.server_url.starts_with("https://")
        {
            self.server_url.clone()
        } else {
            format!("http://{}", self.server_url)
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }

    async fn fetch_record(&self, url: String) -> StoreResult<Option<WeddingRecord>> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<WeddingRecord>()
                .await
                .map(Some)
                .map_err(|e| StoreError::Unavailable(format!("invalid record: {}", e))),
            status => Err(StoreError::Unavailable(format!(
                "server returned status {}",
                status
            ))),
        }
    }

    async fn put_record(&self, owner: &str, patch: &WeddingPatch) -> StoreResult<WeddingRecord> {
        let body = UpsertRequest {
            owner: owner.to_string(),
            patch: patch.clone(),
        };

        let response = self
            .http
            .put(self.build_url("/wedding"))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "server returned status {}",
                status
            )));
        }

        response
            .json::<WeddingRecord>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("invalid record: {}", e)))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.http.post(self.build_url(path)).json(body))
            .await
    }

    /// Creates an account and returns a fresh session.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/register", &body).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    pub async fn profile(&self, session: &str) -> Result<ProfileResponse, ClientError> {
        self.send_json(
            self.http
                .get(self.build_url("/profile"))
                .query(&[("owner", session)]),
        )
        .await
    }

    pub async fn submit_rsvp(&self, rsvp: &NewRsvp) -> Result<RsvpSubmitted, ClientError> {
        self.post("/rsvp", rsvp).await
    }

    /// RSVPs for the owner's wedding, addressed by shareable id.
    pub async fn list_rsvps(&self, session: &str, shareable_id: &str) -> Result<RsvpList, ClientError> {
        let path = format!("/rsvp/shareable/{}", urlencoding::encode(shareable_id));
        self.send_json(
            self.http
                .get(self.build_url(&path))
                .query(&[("owner", session)]),
        )
        .await
    }

    pub async fn sign_guestbook(
        &self,
        entry: &NewGuestbookEntry,
    ) -> Result<GuestbookSubmitted, ClientError> {
        self.post("/guestbook", entry).await
    }

    pub async fn guestbook(&self, shareable_id: &str) -> Result<GuestbookList, ClientError> {
        let path = format!("/guestbook/shareable/{}", urlencoding::encode(shareable_id));
        self.send_json(self.http.get(self.build_url(&path))).await
    }

    /// Public URL of a shareable page on a given site origin.
    pub fn share_url(public_base_url: &str, shareable_id: &str) -> String {
        format!(
            "{}/share/{}",
            public_base_url.trim_end_matches('/'),
            urlencoding::encode(shareable_id)
        )
    }
}

impl RecordStore for HttpStore {
    fn upsert<'a>(
        &'a self,
        owner: &'a str,
        patch: &'a WeddingPatch,
    ) -> BoxFuture<'a, StoreResult<WeddingRecord>> {
        Box::pin(self.put_record(owner, patch))
    }

    fn get_by_owner<'a>(
        &'a self,
        owner: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        let url = format!(
            "{}?owner={}",
            self.build_url("/wedding"),
            urlencoding::encode(owner)
        );
        Box::pin(self.fetch_record(url))
    }

    fn get_by_shareable_id<'a>(
        &'a self,
        shareable_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        let url = self.build_url(&format!(
            "/wedding/share/{}",
            urlencoding::encode(shareable_id)
        ));
        Box::pin(self.fetch_record(url))
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        let url = self.build_url(&format!("/wedding/public/{}", urlencoding::encode(id)));
        Box::pin(self.fetch_record(url))
    }
}

/// Returns true if the server answers its health check.
pub async fn check_server(server_url: &str) -> bool {
    let store = HttpStore::new(server_url);
    let request = store
        .http
        .get(store.build_url("/health"))
        .timeout(HEALTH_TIMEOUT);

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            response.json::<HealthResponse>().await.is_ok()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_http() {
        let store = HttpStore::new("http://localhost:8080");
        assert_eq!(store.build_url("/wedding"), "http://localhost:8080/wedding");
    }

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let store = HttpStore::new("https://cards.example.com/api/");
        assert_eq!(
            store.build_url("/wedding/share/abc"),
            "https://cards.example.com/api/wedding/share/abc"
        );
    }

    #[test]
    fn test_build_url_bare_host() {
        let store = HttpStore::new("localhost:8080");
        assert_eq!(store.build_url("/health"), "http://localhost:8080/health");
    }

    #[test]
    fn test_share_url() {
        assert_eq!(
            HttpStore::share_url("https://cards.example.com/", "abc12345"),
            "https://cards.example.com/share/abc12345"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let store = HttpStore::new("http://127.0.0.1:9");

        let err = store.get_by_owner("sess").await.unwrap_err();
        assert!(err.is_retryable());

        let err = store
            .upsert("sess", &WeddingPatch::new().venue_name("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        assert!(!check_server("http://127.0.0.1:9").await);
    }
}
