use super::{Gender, ListingStatus};

/// Doctor's public directory entry
///
/// Decoupled from the account so a rejected listing never takes the
/// account with it. Profile fields are a denormalised copy taken at
/// submission time and refreshed on profile update.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DoctorListing {
    /// Owning doctor's account id (one listing per doctor)
    #[serde(rename = "_id")]
    pub doctor_id: String,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Contact mobile number
    pub mobile: String,

    /// Age
    pub age: u32,

    /// Gender
    pub gender: Gender,

    /// Medical speciality
    pub speciality: String,

    /// Qualification
    pub qualification: String,

    /// Profile photo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Moderation status
    pub status: ListingStatus,
}
