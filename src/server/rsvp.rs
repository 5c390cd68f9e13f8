use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use weddingcard_core::api::{OwnerQuery, RsvpList, RsvpSubmitted};
use weddingcard_core::models::{NewRsvp, WeddingRecord};
use weddingcard_core::store::RecordStore;

use super::{ApiError, AppState};

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<NewRsvp>, JsonRejection>,
) -> Result<Json<RsvpSubmitted>, ApiError> {
    let Json(rsvp) = payload?;
    rsvp.validate().map_err(ApiError::bad_request)?;

    let wedding = state
        .weddings
        .get_by_id(&rsvp.wedding_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Wedding not found"))?;

    if !wedding.details.rsvp_enabled {
        return Err(ApiError::conflict("RSVPs are closed for this wedding"));
    }

    let rsvp = rsvp.into_rsvp();
    state.rsvps.create(&rsvp).await?;
    tracing::info!(wedding_id = %wedding.id, attendance = %rsvp.attendance, "RSVP received");

    Ok(Json(RsvpSubmitted {
        success: true,
        message: "RSVP submitted successfully".to_string(),
        rsvp_id: rsvp.id,
    }))
}

pub async fn list_by_id(
    State(state): State<AppState>,
    Path(wedding_id): Path<String>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<RsvpList>, ApiError> {
    let Query(query) = query?;
    let wedding = state.weddings.get_by_id(&wedding_id).await?;
    list_for_owner(&state, wedding, &query.owner).await
}

pub async fn list_by_shareable_id(
    State(state): State<AppState>,
    Path(shareable_id): Path<String>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<RsvpList>, ApiError> {
    let Query(query) = query?;
    let wedding = state.weddings.get_by_shareable_id(&shareable_id).await?;
    list_for_owner(&state, wedding, &query.owner).await
}

/// RSVPs are visible to the wedding's owner only.
async fn list_for_owner(
    state: &AppState,
    wedding: Option<WeddingRecord>,
    session: &str,
) -> Result<Json<RsvpList>, ApiError> {
    let user = state.authenticate(session).await?;
    let wedding = wedding.ok_or_else(|| ApiError::not_found("Wedding not found"))?;

    if wedding.owner_session != user.id {
        return Err(ApiError::forbidden("Only the wedding owner can view RSVPs"));
    }

    let rsvps = state.rsvps.list_for_wedding(&wedding.id).await?;
    Ok(Json(RsvpList {
        success: true,
        total_count: rsvps.len(),
        rsvps,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn create_wedding(app: &axum::Router, session: &str, rsvp_enabled: bool) -> Value {
        let (status, body) = send(
            app,
            Method::PUT,
            "/wedding",
            Some(json!({ "owner": session, "rsvp_enabled": rsvp_enabled })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    fn rsvp(wedding_id: &str) -> Value {
        json!({
            "wedding_id": wedding_id,
            "guest_name": "Jo",
            "guest_email": "jo@example.com",
            "attendance": "yes",
            "guest_count": 2
        })
    }

    #[tokio::test]
    async fn test_submit_and_owner_lists() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;
        let wedding = create_wedding(&app, &session, true).await;
        let wedding_id = wedding["id"].as_str().unwrap();

        let (status, body) = send(&app, Method::POST, "/rsvp", Some(rsvp(wedding_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let rsvp_id = body["rsvp_id"].as_str().unwrap().to_string();

        let (status, list) = send(
            &app,
            Method::GET,
            &format!("/rsvp/{}?owner={}", wedding_id, session),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total_count"], 1);
        assert_eq!(list["rsvps"][0]["id"], rsvp_id.as_str());
        assert_eq!(list["rsvps"][0]["guest_count"], 2);

        let (status, list) = send(
            &app,
            Method::GET,
            &format!(
                "/rsvp/shareable/{}?owner={}",
                wedding["shareable_id"].as_str().unwrap(),
                session
            ),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total_count"], 1);
    }

    #[tokio::test]
    async fn test_other_owner_is_forbidden() {
        let (app, _state, _temp) = app().await;
        let owner = register(&app, "ana").await;
        let other = register(&app, "eve").await;
        let wedding = create_wedding(&app, &owner, true).await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/rsvp/{}?owner={}", wedding["id"].as_str().unwrap(), other),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_submit_errors() {
        let (app, _state, _temp) = app().await;
        let session = register(&app, "ana").await;
        let closed = create_wedding(&app, &session, false).await;

        let (status, _) = send(&app, Method::POST, "/rsvp", Some(rsvp("missing"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/rsvp",
            Some(rsvp(closed["id"].as_str().unwrap())),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut zero_guests = rsvp(closed["id"].as_str().unwrap());
        zero_guests["guest_count"] = json!(0);
        let (status, _) = send(&app, Method::POST, "/rsvp", Some(zero_guests)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut bad_attendance = rsvp(closed["id"].as_str().unwrap());
        bad_attendance["attendance"] = json!("maybe");
        let (status, body) = send(&app, Method::POST, "/rsvp", Some(bad_attendance)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }
}
