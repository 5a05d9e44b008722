use crate::{
    config::RejectPolicy,
    models::{Appointment, Role},
    Error, Medibook, Result, Success,
};

/// Resolved caller identity
#[derive(Debug, Clone)]
pub struct Identity {
    pub account_id: String,
    pub role: Role,
}

impl Medibook {
    /// Resolve a bearer token into a caller identity
    ///
    /// Runs before any existence or entitlement check, so an
    /// unauthenticated caller never learns whether a resource exists.
    pub async fn authenticate(&self, token: &str) -> Result<Identity> {
        let session = self
            .database
            .find_session_by_token(token)
            .await?
            .ok_or(Error::InvalidSession)?;

        if session.is_expired(&self.config.sessions) {
            return Err(Error::InvalidSession);
        }

        let account = self.database.find_account(&session.user_id).await?;

        Ok(Identity {
            account_id: account.id,
            role: account.role,
        })
    }
}

impl Identity {
    /// Read access: the caller must be a party on the record
    pub fn assert_party(&self, appointment: &Appointment) -> Success {
        if appointment.patient_id == self.account_id || appointment.doctor_id == self.account_id {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Accepting is reserved for the appointment's doctor
    pub fn assert_may_accept(&self, appointment: &Appointment) -> Success {
        if appointment.doctor_id == self.account_id {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// Rejecting depends on the configured policy
    pub fn assert_may_reject(&self, appointment: &Appointment, policy: &RejectPolicy) -> Success {
        match policy {
            RejectPolicy::EitherOwner => self.assert_party(appointment),
            RejectPolicy::DoctorOnly => self.assert_may_accept(appointment),
        }
    }

    /// Rescheduling is open to either party
    pub fn assert_may_reschedule(&self, appointment: &Appointment) -> Success {
        self.assert_party(appointment)
    }

    /// Cancelling is reserved for the booking patient
    pub fn assert_may_cancel(&self, appointment: &Appointment) -> Success {
        if appointment.patient_id == self.account_id {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}
