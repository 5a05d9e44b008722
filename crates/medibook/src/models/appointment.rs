use chrono::NaiveDate;

use super::Gender;

/// Appointment lifecycle status
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Rescheduled,
    Cancelled,
}

/// Action requested against an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Accept,
    Reject,
    Reschedule,
    Cancel,
}

impl AppointmentStatus {
    /// Whether `action` is legal from this status
    ///
    /// Anything not listed here is an illegal transition, including
    /// re-invoking an action from its own result state.
    pub fn may(self, action: AppointmentAction) -> bool {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        matches!(
            (self, action),
            (Pending | Rescheduled, Accept)
                | (Pending | Rescheduled, Reject)
                | (Pending | Confirmed | Rescheduled, Reschedule)
                | (Pending | Confirmed, Cancel)
        )
    }
}

/// Pending write against an appointment's status
///
/// Applied only if the record still carries the expected prior status, so
/// concurrent conflicting transitions resolve to exactly one winner.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: AppointmentStatus,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

/// Requester details frozen at booking time
///
/// Intentionally decoupled from the live account: later profile edits
/// must not rewrite booking history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub mobile: String,
    pub address: String,
}

/// Appointment model
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Appointment {
    /// Unique Id
    #[serde(rename = "_id")]
    pub id: String,

    /// Booking patient's account id
    pub patient_id: String,

    /// Target doctor's account id
    pub doctor_id: String,

    /// Requester details as entered on the booking form
    pub patient: PatientDetails,

    /// Doctor's name at booking time
    pub doctor_name: String,

    /// Doctor's contact address at booking time
    pub doctor_email: String,

    /// Doctor's speciality at booking time
    pub doctor_speciality: String,

    /// Scheduled date (date only, no time-of-day component)
    pub date: NaiveDate,

    /// Free-text slot label, not validated against availability
    pub time: String,

    /// Reason for the visit
    pub reason: String,

    /// Previous treatment note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_treatment: Option<String>,

    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    /// Stored medical certificate URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,

    /// Lifecycle status
    pub status: AppointmentStatus,
}
