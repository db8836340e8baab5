use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::error;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::matchmaking::requests::JoinQueueRequest;
use shared::models::matchmaking::responses::{FindMatchResponse, JoinQueueResponse};
use shared::services::matchmaker::PairingOutcome;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matchmaking/join", post(join_queue))
        .route("/matchmaking/leave", post(leave_queue))
        .route("/matchmaking/find", post(find_match))
}

async fn join_queue(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<JoinQueueRequest>,
) -> Result<Json<JoinQueueResponse>, ApiError> {
    let entry = state
        .queue_service
        .join(&authenticated_user.user_id, payload.trophies)
        .await
        .map_err(|e| {
            error!(
                "Failed to enqueue user {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;

    Ok(Json(JoinQueueResponse {
        joined_at: entry.joined_at,
    }))
}

async fn leave_queue(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<StatusCode, ApiError> {
    state
        .queue_service
        .leave(&authenticated_user.user_id)
        .await
        .map_err(|e| {
            error!(
                "Failed to dequeue user {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;

    Ok(StatusCode::OK)
}

/// One pairing attempt. Clients poll this while searching; the response is
/// terminal only when `found` is true or the caller is no longer queued.
async fn find_match(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<FindMatchResponse>, ApiError> {
    let outcome = state
        .matchmaker
        .find_match(&authenticated_user.user_id)
        .await
        .map_err(|e| {
            error!(
                "Pairing attempt failed for user {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })?;

    let response = match outcome {
        PairingOutcome::Found(m) => FindMatchResponse::found(&m),
        PairingOutcome::NoOpponent => FindMatchResponse::not_found("No opponent available yet"),
        PairingOutcome::NotQueued => FindMatchResponse::not_found("Not in queue"),
    };
    Ok(Json(response))
}
