use crate::{
    models::{
        Account, Appointment, AppointmentStatus, DoctorListing, Session, StatusChange,
        VerificationCode,
    },
    Result, Success,
};

use super::Migration;

#[async_trait]
pub trait AbstractDatabase: std::marker::Sync {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success;

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account>;

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>>;

    /// Save account
    async fn save_account(&self, account: &Account) -> Success;

    /// Find the live verification code for an email, if any
    async fn find_verification_code(&self, email: &str) -> Result<Option<VerificationCode>>;

    /// Save verification code, replacing any previous code for the email
    async fn save_verification_code(&self, code: &VerificationCode) -> Success;

    /// Delete verification code
    async fn delete_verification_code(&self, email: &str) -> Success;

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session>;

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Save session
    async fn save_session(&self, session: &Session) -> Success;

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success;

    /// Find a doctor's listing, if any
    async fn find_listing(&self, doctor_id: &str) -> Result<Option<DoctorListing>>;

    /// Find all accepted listings, for public directory consumption
    async fn find_accepted_listings(&self) -> Result<Vec<DoctorListing>>;

    /// Save listing
    async fn save_listing(&self, listing: &DoctorListing) -> Success;

    /// Find appointment by id
    async fn find_appointment(&self, id: &str) -> Result<Appointment>;

    /// Find appointments where the account is either party
    async fn find_appointments_for(&self, account_id: &str) -> Result<Vec<Appointment>>;

    /// Save appointment
    async fn save_appointment(&self, appointment: &Appointment) -> Success;

    /// Apply a status change if the record still carries `expected`
    ///
    /// Returns the updated appointment; a record whose status has moved on
    /// yields `IllegalTransition`, an absent record `UnknownAppointment`.
    async fn transition_appointment(
        &self,
        id: &str,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Appointment>;
}
