use std::sync::Arc;

use tracing::{error, info};

use crate::models::matchmaking::MatchPush;
use crate::repositories::connection_repository::ConnectionRepository;

/// Fans a match event out to both participants over their live WebSocket
/// connections, if any. Push is best-effort: players without a registered
/// connection still converge through polling.
pub struct PushService {
    connection_repository: Arc<dyn ConnectionRepository>,
}

impl PushService {
    pub fn new(connection_repository: Arc<dyn ConnectionRepository>) -> Self {
        PushService {
            connection_repository,
        }
    }

    pub async fn notify_match_players(&self, push: &MatchPush) {
        let online_match = push.match_row();
        let payload = match serde_json::to_string(push) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize push for match {}: {}", online_match.id, e);
                return;
            }
        };

        for player_id in [&online_match.player1_id, &online_match.player2_id] {
            self.notify_player(player_id, &online_match.id, &payload).await;
        }
    }

    async fn notify_player(&self, player_id: &str, match_id: &str, payload: &str) {
        let connection_id = match self.connection_repository.get_connection_id(player_id).await {
            Ok(Some(connection_id)) => connection_id,
            Ok(None) => {
                info!(
                    "No live connection for player {}, match {} delivered by polling",
                    player_id, match_id
                );
                return;
            }
            Err(e) => {
                error!("Failed to look up connection for {}: {}", player_id, e);
                return;
            }
        };

        match self
            .connection_repository
            .send_message(&connection_id, payload)
            .await
        {
            Ok(()) => {
                info!("Pushed match {} update to player {}", match_id, player_id);
            }
            Err(e) => {
                error!(
                    "Failed to push match {} to player {}: {}",
                    match_id, player_id, e
                );
            }
        }
    }
}
