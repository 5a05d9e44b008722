use chrono::{Duration, Utc};

use crate::{config::SessionConfig, models::Session, Medibook, MedibookEvent, Success};

impl Session {
    /// Save model
    pub async fn save(&self, medibook: &Medibook) -> Success {
        medibook.database.save_session(self).await
    }

    /// Whether this session is past the configured validity window
    pub fn is_expired(&self, config: &SessionConfig) -> bool {
        let now = Utc::now();
        let expiry = ulid::Ulid::from_string(&self.id)
            .expect("Valid `ulid`")
            .datetime()
            .checked_add_signed(Duration::seconds(config.expire_session))
            .expect("checked add signed");

        now > expiry
    }

    /// Delete session
    pub async fn delete(self, medibook: &Medibook) -> Success {
        // Delete from database
        medibook.database.delete_session(&self.id).await?;

        // Create and push event
        medibook
            .publish_event(MedibookEvent::DeleteSession {
                user_id: self.user_id,
                session_id: self.id,
            })
            .await;

        Ok(())
    }
}
