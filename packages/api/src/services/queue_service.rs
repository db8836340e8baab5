use std::sync::Arc;

use tracing::info;

use shared::models::queue::QueueEntry;
use shared::repositories::queue_repository::QueueRepository;

use crate::services::errors::queue_service_errors::QueueServiceError;

pub struct QueueService {
    queue_repository: Arc<dyn QueueRepository>,
}

impl QueueService {
    pub fn new(queue_repository: Arc<dyn QueueRepository>) -> Self {
        QueueService { queue_repository }
    }

    /// Enqueues the caller, replacing any stale entry from an earlier
    /// attempt. The returned entry carries the server `joined_at` the client
    /// uses as its clock anchor.
    pub async fn join(
        &self,
        user_id: &str,
        trophies: i32,
    ) -> Result<QueueEntry, QueueServiceError> {
        if trophies < 0 {
            return Err(QueueServiceError::ValidationError(
                "Trophies cannot be negative".to_string(),
            ));
        }

        self.queue_repository.delete_entry(user_id).await?;

        let entry = QueueEntry::new(user_id, trophies);
        self.queue_repository.insert_entry(&entry).await?;

        info!("User {} joined queue with {} trophies", user_id, trophies);
        Ok(entry)
    }

    /// Removing an absent entry succeeds; cancel and timeout paths call this
    /// without knowing whether pairing already evicted the row.
    pub async fn leave(&self, user_id: &str) -> Result<(), QueueServiceError> {
        self.queue_repository.delete_entry(user_id).await?;
        info!("User {} left queue", user_id);
        Ok(())
    }
}
