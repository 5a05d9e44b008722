use iso8601_timestamp::Timestamp;

/// One-time verification code
///
/// Keyed by email: issuing a new code replaces the previous one, so at
/// most one code is live per address.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    /// Email address this code was issued for
    #[serde(rename = "_id")]
    pub email: String,

    /// Six-digit numeric code
    pub code: String,

    /// Time at which this code expires
    ///
    /// Checked lazily when the code is presented; records past expiry are
    /// treated as absent even if not yet removed.
    pub expiry: Timestamp,
}
