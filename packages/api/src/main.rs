use axum::{routing::get, Router};
use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use services::match_service::MatchService;
use services::queue_service::QueueService;
use shared::repositories::match_repository::DynamoDbMatchRepository;
use shared::repositories::profile_repository::DynamoDbProfileRepository;
use shared::repositories::queue_repository::DynamoDbQueueRepository;
use shared::services::auth_service::TokenVerifier;
use shared::services::matchmaker::MatchmakerService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    // Set up services
    let config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&config);

    let queue_repository = Arc::new(DynamoDbQueueRepository::new(client.clone()));
    let match_repository = Arc::new(DynamoDbMatchRepository::new(client.clone()));
    let profile_repository = Arc::new(DynamoDbProfileRepository::new(client.clone()));

    let queue_service = Arc::new(QueueService::new(queue_repository.clone()));
    let match_service = Arc::new(MatchService::new(match_repository.clone()));
    let matchmaker = Arc::new(MatchmakerService::new(queue_repository, match_repository));
    let token_verifier = Arc::new(TokenVerifier::new());

    let app_state = state::AppState {
        token_verifier,
        queue_service,
        match_service,
        matchmaker,
        profile_repository,
    };

    // Configure CORS
    // ToDo: Tighten this up
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Merge routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::matchmaking::routes())
        .merge(routes::matches::routes())
        .merge(routes::profiles::routes())
        .layer(cors)
        .with_state(app_state);

    run(app).await
}
