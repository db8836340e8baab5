use aws_lambda_events::event::dynamodb::EventRecord;
use serde_dynamo::aws_sdk_dynamodb_1::from_item;
use tracing::info;

use shared::models::matchmaking::MatchPush;
use shared::models::online_match::OnlineMatch;
use shared::services::push_service::PushService;

/// Translates one match table stream record into a push to both players.
/// INSERT means the pair was just formed; MODIFY carries score, round and
/// completion changes. Push failures are not retried, polling covers them.
pub async fn process_record(
    push_service: &PushService,
    record: EventRecord,
) -> Result<(), Box<dyn std::error::Error>> {
    match record.event_name.as_str() {
        "INSERT" => {
            let online_match: OnlineMatch = from_item(record.change.new_image.into())?;
            info!(
                "New match {} between {} and {}",
                online_match.id, online_match.player1_id, online_match.player2_id
            );
            push_service
                .notify_match_players(&MatchPush::MatchCreated(online_match))
                .await;
        }
        "MODIFY" => {
            let online_match: OnlineMatch = from_item(record.change.new_image.into())?;
            info!(
                "Match {} updated: round {}, scores {}:{}",
                online_match.id,
                online_match.current_round,
                online_match.player1_score,
                online_match.player2_score
            );
            push_service
                .notify_match_players(&MatchPush::MatchUpdated(online_match))
                .await;
        }
        _ => {
            info!("Unhandled event type: {}", record.event_name);
        }
    }

    Ok(())
}
