use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};

use weddingcard_core::api::{AuthResponse, Credentials, OwnerQuery, ProfileResponse};

use super::{ApiError, AppState};
use crate::db::User;

fn auth_response(user: User, session_id: String) -> Json<AuthResponse> {
    Json(AuthResponse {
        session_id,
        user_id: user.id,
        username: user.username,
        success: true,
    })
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(credentials) = payload?;
    let (user, session) = state
        .users
        .register(&credentials.username, &credentials.password)
        .await?;
    Ok(auth_response(user, session))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(credentials) = payload?;
    let (user, session) = state
        .users
        .login(&credentials.username, &credentials.password)
        .await?;
    Ok(auth_response(user, session))
}

pub async fn profile(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Query(query) = query?;
    let user = state.authenticate(&query.owner).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
    }))
}
