mod booking;
mod mail;
mod policies;
mod sessions;
mod verification;

pub use booking::*;
pub use mail::*;
pub use policies::*;
pub use sessions::*;
pub use verification::*;

/// Medibook configuration
#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// One-time code issuance
    pub verification: VerificationConfig,

    /// Session validity window
    pub sessions: SessionConfig,

    /// Booking field rules and window
    pub booking: BookingConfig,

    /// Listing moderation policy
    pub moderation: ModerationPolicy,

    /// Who may reject an appointment
    pub rejection: RejectPolicy,

    /// Which roles must carry a secret
    pub secrets: SecretPolicy,

    /// Whether patients may cancel their own bookings
    pub cancellation: bool,

    /// Notification templates
    pub templates: Templates,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            verification: Default::default(),
            sessions: Default::default(),
            booking: Default::default(),
            moderation: Default::default(),
            rejection: Default::default(),
            secrets: Default::default(),
            cancellation: true,
            templates: Default::default(),
        }
    }
}
