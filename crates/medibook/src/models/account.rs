/// Account role
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

/// Self-reported gender
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Public visibility of a doctor's directory entry
///
/// Cached on the account; the listing record is the source of truth.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    None,
    Pending,
    Accepted,
    Rejected,
}

impl Default for ListingStatus {
    fn default() -> ListingStatus {
        ListingStatus::None
    }
}

/// Account model
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    /// Unique Id
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// User's email
    pub email: String,

    /// Normalised email
    pub email_normalised: String,

    /// Mobile number
    pub mobile: String,

    /// Self-reported age
    pub age: u32,

    /// Self-reported gender
    pub gender: Gender,

    /// Account role
    pub role: Role,

    /// Argon2 hashed secret
    ///
    /// Absent for roles the secret policy exempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Postal address (patients)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Medical speciality (doctors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,

    /// Qualification (doctors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,

    /// Profile photo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Cached listing status (doctors)
    #[serde(default)]
    pub listing_status: ListingStatus,

    /// Whether the email behind this account was verified
    ///
    /// Always true for accounts created through registration, which is
    /// gated on a one-time code.
    #[serde(default)]
    pub verified: bool,
}
