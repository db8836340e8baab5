use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::error;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::matchmaking::requests::{
    CompleteMatchRequest, RoundAdvanceRequest, ScoreUpdateRequest,
};
use shared::models::online_match::OnlineMatch;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/score", put(update_score))
        .route("/matches/{id}/round", put(advance_round))
        .route("/matches/{id}/complete", post(complete_match))
}

async fn get_match(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(match_id): Path<String>,
) -> Result<Json<OnlineMatch>, ApiError> {
    state
        .match_service
        .get_match(&match_id, &authenticated_user.user_id)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

async fn update_score(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(match_id): Path<String>,
    Json(payload): Json<ScoreUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .match_service
        .submit_score(&match_id, &authenticated_user.user_id, payload.score)
        .await
        .map_err(|e| {
            error!(
                "Score update failed for match {} by {}: {}",
                match_id, authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;
    Ok(StatusCode::OK)
}

async fn advance_round(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(match_id): Path<String>,
    Json(payload): Json<RoundAdvanceRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .match_service
        .advance_round(&match_id, &authenticated_user.user_id, payload.round)
        .await
        .map_err(|e| {
            error!(
                "Round advance failed for match {} by {}: {}",
                match_id, authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;
    Ok(StatusCode::OK)
}

async fn complete_match(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(match_id): Path<String>,
    Json(payload): Json<CompleteMatchRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .match_service
        .complete_match(
            &match_id,
            &authenticated_user.user_id,
            payload.winner_id.as_deref(),
        )
        .await
        .map_err(|e| {
            error!(
                "Completion failed for match {} by {}: {}",
                match_id, authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;
    Ok(StatusCode::OK)
}
