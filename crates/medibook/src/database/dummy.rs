use crate::{
    models::{
        Account, Appointment, AppointmentStatus, DoctorListing, ListingStatus, Session,
        StatusChange, VerificationCode,
    },
    Error, Result, Success,
};

use futures::lock::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{definition::AbstractDatabase, Migration};

#[derive(Default, Clone)]
pub struct DummyDb {
    pub accounts: Arc<Mutex<HashMap<String, Account>>>,
    pub codes: Arc<Mutex<HashMap<String, VerificationCode>>>,
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
    pub listings: Arc<Mutex<HashMap<String, DoctorListing>>>,
    pub appointments: Arc<Mutex<HashMap<String, Appointment>>>,
}

#[async_trait]
impl AbstractDatabase for DummyDb {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success {
        println!("skip migration {:?}", migration);
        Ok(())
    }

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account> {
        let accounts = self.accounts.lock().await;
        accounts.get(id).cloned().ok_or(Error::UnknownUser)
    }

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| account.email_normalised == normalised_email)
            .cloned())
    }

    /// Save account
    async fn save_account(&self, account: &Account) -> Success {
        let mut accounts = self.accounts.lock().await;
        accounts.insert(account.id.to_string(), account.clone());
        Ok(())
    }

    /// Find the live verification code for an email, if any
    async fn find_verification_code(&self, email: &str) -> Result<Option<VerificationCode>> {
        let codes = self.codes.lock().await;
        Ok(codes.get(email).cloned())
    }

    /// Save verification code, replacing any previous code for the email
    async fn save_verification_code(&self, code: &VerificationCode) -> Success {
        let mut codes = self.codes.lock().await;
        codes.insert(code.email.to_string(), code.clone());
        Ok(())
    }

    /// Delete verification code
    async fn delete_verification_code(&self, email: &str) -> Success {
        let mut codes = self.codes.lock().await;
        if codes.remove(email).is_some() {
            Ok(())
        } else {
            Err(Error::InvalidCode)
        }
    }

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session> {
        let sessions = self.sessions.lock().await;
        sessions.get(id).cloned().ok_or(Error::InvalidSession)
    }

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .values()
            .find(|session| session.token == token)
            .cloned())
    }

    /// Save session
    async fn save_session(&self, session: &Session) -> Success {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.to_string(), session.clone());
        Ok(())
    }

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success {
        let mut sessions = self.sessions.lock().await;
        if sessions.remove(id).is_some() {
            Ok(())
        } else {
            Err(Error::InvalidSession)
        }
    }

    /// Find a doctor's listing, if any
    async fn find_listing(&self, doctor_id: &str) -> Result<Option<DoctorListing>> {
        let listings = self.listings.lock().await;
        Ok(listings.get(doctor_id).cloned())
    }

    /// Find all accepted listings
    async fn find_accepted_listings(&self) -> Result<Vec<DoctorListing>> {
        let listings = self.listings.lock().await;
        Ok(listings
            .values()
            .filter(|listing| matches!(listing.status, ListingStatus::Accepted))
            .cloned()
            .collect())
    }

    /// Save listing
    async fn save_listing(&self, listing: &DoctorListing) -> Success {
        let mut listings = self.listings.lock().await;
        listings.insert(listing.doctor_id.to_string(), listing.clone());
        Ok(())
    }

    /// Find appointment by id
    async fn find_appointment(&self, id: &str) -> Result<Appointment> {
        let appointments = self.appointments.lock().await;
        appointments
            .get(id)
            .cloned()
            .ok_or(Error::UnknownAppointment)
    }

    /// Find appointments where the account is either party
    async fn find_appointments_for(&self, account_id: &str) -> Result<Vec<Appointment>> {
        let appointments = self.appointments.lock().await;
        Ok(appointments
            .values()
            .filter(|appointment| {
                appointment.patient_id == account_id || appointment.doctor_id == account_id
            })
            .cloned()
            .collect())
    }

    /// Save appointment
    async fn save_appointment(&self, appointment: &Appointment) -> Success {
        let mut appointments = self.appointments.lock().await;
        appointments.insert(appointment.id.to_string(), appointment.clone());
        Ok(())
    }

    /// Apply a status change if the record still carries `expected`
    ///
    /// The map mutex serialises concurrent transitions; exactly one of two
    /// racing writers observes `expected` and wins.
    async fn transition_appointment(
        &self,
        id: &str,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Appointment> {
        let mut appointments = self.appointments.lock().await;
        let appointment = appointments.get_mut(id).ok_or(Error::UnknownAppointment)?;

        if appointment.status != expected {
            return Err(Error::IllegalTransition);
        }

        appointment.status = change.status;
        if let Some(date) = change.date {
            appointment.date = date;
        }
        if let Some(time) = change.time {
            appointment.time = time;
        }

        Ok(appointment.clone())
    }
}
