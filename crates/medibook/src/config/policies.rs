use crate::models::{DoctorListing, ListingStatus, Role};

/// Listing moderation policy
///
/// The full pending/accepted/rejected machine exists either way; this
/// hook only decides where a submission lands.
#[derive(Serialize, Deserialize, Clone)]
pub enum ModerationPolicy {
    /// Every submission is accepted immediately
    AutoAccept,
    /// Submissions wait in `pending` for a moderation verdict
    Queue,
}

impl Default for ModerationPolicy {
    fn default() -> ModerationPolicy {
        ModerationPolicy::AutoAccept
    }
}

impl ModerationPolicy {
    /// Decide the status of a submitted or refreshed listing
    pub fn decide(&self, _listing: &DoctorListing) -> ListingStatus {
        match self {
            ModerationPolicy::AutoAccept => ListingStatus::Accepted,
            ModerationPolicy::Queue => ListingStatus::Pending,
        }
    }
}

/// Who may reject an appointment
#[derive(Serialize, Deserialize, Clone)]
pub enum RejectPolicy {
    /// Either party on the record
    EitherOwner,
    /// The appointment's doctor only
    DoctorOnly,
}

impl Default for RejectPolicy {
    fn default() -> RejectPolicy {
        RejectPolicy::EitherOwner
    }
}

/// Which roles must carry a secret
#[derive(Serialize, Deserialize, Clone)]
pub enum SecretPolicy {
    /// Patients authenticate with a secret, doctors are passwordless
    PatientsOnly,
    /// Every role carries a secret
    AllRoles,
}

impl Default for SecretPolicy {
    fn default() -> SecretPolicy {
        SecretPolicy::PatientsOnly
    }
}

impl SecretPolicy {
    /// Whether accounts of this role must hold a secret
    pub fn required_for(&self, role: Role) -> bool {
        match self {
            SecretPolicy::AllRoles => true,
            SecretPolicy::PatientsOnly => matches!(role, Role::Patient),
        }
    }
}
