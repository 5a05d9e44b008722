use chrono::Duration;
use iso8601_timestamp::Timestamp;

/// One-time code issuance config
#[derive(Serialize, Deserialize, Clone)]
pub struct VerificationConfig {
    /// How long issued codes should last for (in seconds)
    pub expire_code: i64,
}

impl Default for VerificationConfig {
    fn default() -> VerificationConfig {
        VerificationConfig {
            expire_code: 5 * 60,
        }
    }
}

impl VerificationConfig {
    /// Expiry timestamp for a code issued now
    pub fn expiry(&self) -> Timestamp {
        Timestamp::from_unix_timestamp_ms(
            chrono::Utc::now()
                .checked_add_signed(Duration::seconds(self.expire_code))
                .expect("failed to checked_add_signed")
                .timestamp_millis(),
        )
    }
}
