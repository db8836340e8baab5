use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::error;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::profile::PlayerProfile;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profiles/{user_id}", get(get_profile))
}

/// Any authenticated player may read any profile; opponents need each
/// other's display name and avatar for the match header.
async fn get_profile(
    State(state): State<AppState>,
    _authenticated_user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<PlayerProfile>, ApiError> {
    state
        .profile_repository
        .get_profile(&user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load profile {}: {}", user_id, e);
            ApiError::from(e)
        })
}
