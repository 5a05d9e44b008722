use iso8601_timestamp::Timestamp;

use crate::{
    models::{Role, VerificationCode},
    util, Error, Medibook, Result, Success,
};

impl VerificationCode {
    /// Issue a fresh code for an address, replacing any previous one
    ///
    /// Upsert-by-email: codes never stack, the last issue wins. A check
    /// racing an overwriting issue may fail against the new code, which
    /// is the expected outcome of that race.
    pub async fn issue(medibook: &Medibook, email: String, role: Role) -> Result<VerificationCode> {
        util::assert_email(&email)?;

        let email_normalised = util::normalise_email(email.clone());
        if medibook
            .database
            .find_account_by_normalised_email(&email_normalised)
            .await?
            .is_some()
        {
            return Err(Error::EmailInUse);
        }

        let code = VerificationCode {
            email: email.clone(),
            code: util::generate_code(),
            expiry: medibook.config.verification.expiry(),
        };

        medibook.database.save_verification_code(&code).await?;

        // Without this email the caller has no path forward, so delivery
        // failure is surfaced here instead of swallowed.
        medibook
            .dispatcher
            .send(
                &[email],
                &medibook.config.templates.verification,
                json!({ "code": code.code, "role": role }),
            )
            .await?;

        Ok(code)
    }

    /// Check a presented code without consuming it
    ///
    /// May be called more than once across a multi-step flow; only
    /// `claim` removes the record.
    pub async fn check(medibook: &Medibook, email: &str, code: &str) -> Result<VerificationCode> {
        let record = medibook
            .database
            .find_verification_code(email)
            .await?
            .ok_or(Error::InvalidCode)?;

        if record.is_expired() || record.code != code {
            return Err(Error::InvalidCode);
        }

        Ok(record)
    }

    /// Whether this code is past its expiry
    ///
    /// Expiry is lazy: a stored record past this point is treated as
    /// absent, no background sweep exists.
    pub fn is_expired(&self) -> bool {
        Timestamp::now_utc() > self.expiry
    }

    /// Claim and remove this code
    pub async fn claim(&self, medibook: &Medibook) -> Success {
        if self.is_expired() {
            return Err(Error::InvalidCode);
        }

        medibook.database.delete_verification_code(&self.email).await
    }
}
