use crate::models::{Account, Appointment, ListingStatus, Session};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event_type")]
pub enum MedibookEvent {
    CreateAccount {
        account: Account,
    },
    CreateSession {
        session: Session,
    },
    DeleteSession {
        user_id: String,
        session_id: String,
    },
    ListingStatusChanged {
        doctor_id: String,
        status: ListingStatus,
    },
    AppointmentBooked {
        appointment: Appointment,
    },
    AppointmentTransition {
        appointment: Appointment,
    },
}
