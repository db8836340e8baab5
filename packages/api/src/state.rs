use std::sync::Arc;

use shared::repositories::profile_repository::ProfileRepository;
use shared::services::auth_service::TokenVerifier;
use shared::services::matchmaker::MatchmakerService;

use crate::services::match_service::MatchService;
use crate::services::queue_service::QueueService;

#[derive(Clone)]
pub struct AppState {
    pub token_verifier: Arc<TokenVerifier>,
    pub queue_service: Arc<QueueService>,
    pub match_service: Arc<MatchService>,
    pub matchmaker: Arc<MatchmakerService>,
    pub profile_repository: Arc<dyn ProfileRepository>,
}
