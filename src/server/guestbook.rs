use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use weddingcard_core::api::{GuestbookList, GuestbookSubmitted};
use weddingcard_core::models::{NewGuestbookEntry, WeddingRecord};
use weddingcard_core::store::RecordStore;

use super::{ApiError, AppState};

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<NewGuestbookEntry>, JsonRejection>,
) -> Result<Json<GuestbookSubmitted>, ApiError> {
    let Json(entry) = payload?;
    entry.validate().map_err(ApiError::bad_request)?;

    if state.weddings.get_by_id(&entry.wedding_id).await?.is_none() {
        return Err(ApiError::not_found("Wedding not found"));
    }

    let entry = entry.into_entry();
    state.guestbook.create(&entry).await?;

    Ok(Json(GuestbookSubmitted {
        success: true,
        message: "Guestbook message added successfully".to_string(),
        message_id: entry.id,
    }))
}

pub async fn list_by_id(
    State(state): State<AppState>,
    Path(wedding_id): Path<String>,
) -> Result<Json<GuestbookList>, ApiError> {
    let wedding = state.weddings.get_by_id(&wedding_id).await?;
    list(&state, wedding).await
}

pub async fn list_by_shareable_id(
    State(state): State<AppState>,
    Path(shareable_id): Path<String>,
) -> Result<Json<GuestbookList>, ApiError> {
    let wedding = state.weddings.get_by_shareable_id(&shareable_id).await?;
    list(&state, wedding).await
}

async fn list(state: &AppState, wedding: Option<WeddingRecord>) -> Result<Json<GuestbookList>, ApiError> {
    let wedding = wedding.ok_or_else(|| ApiError::not_found("Wedding not found"))?;
    let messages = state.guestbook.list_for_wedding(&wedding.id).await?;

    Ok(Json(GuestbookList {
        success: true,
        total_count: messages.len(),
        messages,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_and_read_guestbook() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;
        let (_, wedding) = send(
            &app,
            Method::PUT,
            "/wedding",
            Some(json!({ "owner": session })),
        )
        .await;
        let wedding_id = wedding["id"].as_str().unwrap();

        for name in ["First", "Second"] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/guestbook",
                Some(json!({
                    "wedding_id": wedding_id,
                    "name": name,
                    "message": "So happy for you"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["message_id"].is_string());
        }

        let (status, list) = send(
            &app,
            Method::GET,
            &format!("/guestbook/shareable/{}", wedding["shareable_id"].as_str().unwrap()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total_count"], 2);
        assert_eq!(list["messages"][0]["name"], "Second");

        let (status, list) =
            send(&app, Method::GET, &format!("/guestbook/{}", wedding_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total_count"], 2);
    }

    #[tokio::test]
    async fn test_guestbook_errors() {
        let (app, _state, _temp) = app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/guestbook",
            Some(json!({ "wedding_id": "missing", "name": "Jo", "message": "Hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/guestbook",
            Some(json!({ "wedding_id": "missing", "name": "Jo", "message": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/guestbook/shareable/abc123", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
