use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use weddingcard_core::api::{OwnerQuery, UpsertRequest};
use weddingcard_core::models::WeddingRecord;
use weddingcard_core::resolver::{resolve_public_id, PublicId};
use weddingcard_core::store::RecordStore;

use super::{ApiError, AppState};

/// `GET /wedding?owner=` - the caller's own record.
pub async fn get_owner_wedding(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<WeddingRecord>, ApiError> {
    let Query(query) = query?;
    let user = state.authenticate(&query.owner).await?;

    state
        .weddings
        .get_by_owner(&user.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No wedding saved yet"))
}

/// `PUT /wedding` - merge the patch into the caller's record.
pub async fn upsert_wedding(
    State(state): State<AppState>,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<Json<WeddingRecord>, ApiError> {
    let Json(request) = payload?;
    let user = state.authenticate(&request.owner).await?;

    let record = state.weddings.upsert(&user.id, &request.patch).await?;
    tracing::debug!(id = %record.id, "Saved wedding");
    Ok(Json(record))
}

pub async fn get_shared_wedding(
    State(state): State<AppState>,
    Path(shareable_id): Path<String>,
) -> Result<Json<WeddingRecord>, ApiError> {
    public_record(&state, PublicId::Shareable(shareable_id)).await
}

/// Lookup by internal id, for links shared before shareable ids existed.
pub async fn get_legacy_wedding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeddingRecord>, ApiError> {
    public_record(&state, PublicId::Legacy(id)).await
}

async fn public_record(state: &AppState, id: PublicId) -> Result<Json<WeddingRecord>, ApiError> {
    let record = resolve_public_id(&state.weddings, &id).await?;
    Ok(Json(record.without_owner()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_new_owner_has_no_wedding() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;

        let (status, body) = send(&app, Method::GET, &format!("/wedding?owner={}", session), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_unknown_session_is_unauthorized() {
        let (app, _state, _temp) = app().await;

        let (status, _) = send(&app, Method::GET, "/wedding?owner=bogus", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/wedding",
            Some(json!({ "owner": "bogus", "venue_name": "Barn" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upsert_merges_and_keeps_ids() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;

        let (status, first) = send(
            &app,
            Method::PUT,
            "/wedding",
            Some(json!({ "session_id": session, "couple_name_1": "Ana", "theme": "modern" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["couple_name_1"], "Ana");
        assert_eq!(first["couple_name_2"], "Michael");

        let (_, second) = send(
            &app,
            Method::PUT,
            "/wedding",
            Some(json!({
                "owner": session,
                "gallery_photos": [{ "url": "https://img.example.com/1.jpg" }],
                "id": "forged-id"
            })),
        )
        .await;
        assert_eq!(second["id"], first["id"]);
        assert_eq!(second["shareable_id"], first["shareable_id"]);
        assert_eq!(second["theme"], "modern");
        assert_eq!(second["gallery_photos"][0]["url"], "https://img.example.com/1.jpg");

        let (status, fetched) =
            send(&app, Method::GET, &format!("/api/wedding?owner={}", session), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, second);
    }

    #[tokio::test]
    async fn test_public_lookups_strip_owner() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;
        let (_, saved) = send(
            &app,
            Method::PUT,
            "/wedding",
            Some(json!({ "owner": session, "venue_name": "Old Mill" })),
        )
        .await;

        let shareable_id = saved["shareable_id"].as_str().unwrap();
        let (status, shared) =
            send(&app, Method::GET, &format!("/wedding/share/{}", shareable_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shared["venue_name"], "Old Mill");
        assert!(shared.get("owner_session").is_none());

        let id = saved["id"].as_str().unwrap();
        let (status, legacy) =
            send(&app, Method::GET, &format!("/wedding/public/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(legacy["shareable_id"], shareable_id);
    }

    #[tokio::test]
    async fn test_unknown_shareable_id_is_404() {
        let (app, _state, _temp) = app().await;

        let (status, body) = send(&app, Method::GET, "/wedding/share/abc123", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("abc123"));
    }

    #[tokio::test]
    async fn test_missing_owner_query_is_json_400() {
        let (app, _state, _temp) = app().await;

        for uri in ["/wedding", "/profile", "/rsvp/shareable/abc123"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "invalid_request", "{}", uri);
        }
    }
}
