use std::env;
use std::sync::Arc;

use aws_lambda_events::event::dynamodb::Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{error, info};

use shared::repositories::connection_repository::DynamoDbConnectionRepository;
use shared::services::push_service::PushService;

mod processor;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    info!("Match notifier Lambda function starting");

    let config = aws_config::load_from_env().await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);

    let websocket_endpoint = env::var("WEBSOCKET_API_ENDPOINT")
        .expect("WEBSOCKET_API_ENDPOINT environment variable must be set");
    let api_gateway_config = aws_sdk_apigatewaymanagement::config::Builder::from(&config)
        .endpoint_url(websocket_endpoint)
        .build();
    let api_gateway_client = aws_sdk_apigatewaymanagement::Client::from_conf(api_gateway_config);

    let connection_repository = Arc::new(DynamoDbConnectionRepository::new(
        dynamodb_client,
        api_gateway_client,
    ));
    let push_service = Arc::new(PushService::new(connection_repository));

    run(service_fn(move |event: LambdaEvent<Event>| {
        let push_service = push_service.clone();
        async move {
            let (event, _context) = event.into_parts();

            info!("Processing {} records", event.records.len());

            for record in event.records {
                if let Err(e) = processor::process_record(&push_service, record).await {
                    error!("Failed to process record: {}", e);
                }
            }

            Ok::<(), Error>(())
        }
    }))
    .await
}
