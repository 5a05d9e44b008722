use crate::{
    models::{Account, DoctorListing, Gender, ListingStatus, Role, Session, VerificationCode},
    storage::Attachment,
    util, Error, Medibook, MedibookEvent, Result, Success,
};

/// Registration form, tagged by role
///
/// Role-specific requirements live on the variant itself rather than
/// being checked against whichever fields happen to be present.
#[derive(Debug, Clone)]
pub enum RegistrationData {
    Patient {
        name: String,
        age: u32,
        gender: Gender,
        mobile: String,
        address: String,
        secret: Option<String>,
        photo: Option<Attachment>,
    },
    Doctor {
        name: String,
        age: u32,
        gender: Gender,
        mobile: String,
        speciality: String,
        qualification: String,
        secret: Option<String>,
        photo: Option<Attachment>,
    },
}

impl RegistrationData {
    pub fn role(&self) -> Role {
        match self {
            RegistrationData::Patient { .. } => Role::Patient,
            RegistrationData::Doctor { .. } => Role::Doctor,
        }
    }
}

/// Profile update form
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub age: u32,
    pub gender: Gender,
    pub address: Option<String>,
    pub speciality: Option<String>,
    pub qualification: Option<String>,
    pub photo: Option<Attachment>,
}

impl Account {
    /// Create a new account from a verified registration
    ///
    /// The code was already checked when the form was opened; it is
    /// checked again here and consumed at the point of account creation.
    pub async fn register(
        medibook: &Medibook,
        email: String,
        code: &str,
        data: RegistrationData,
    ) -> Result<Account> {
        let code = VerificationCode::check(medibook, &email, code).await?;

        util::assert_email(&email)?;

        let role = data.role();
        let secret = match &data {
            RegistrationData::Patient { secret, .. } | RegistrationData::Doctor { secret, .. } => {
                secret.clone()
            }
        };
        let secret = Account::prepare_secret(medibook, role, secret)?;

        let (name, age, gender, mobile, address, speciality, qualification, photo) = match data {
            RegistrationData::Patient {
                name,
                age,
                gender,
                mobile,
                address,
                photo,
                ..
            } => {
                util::assert_length(&address, 5, "address")?;
                (name, age, gender, mobile, Some(address), None, None, photo)
            }
            RegistrationData::Doctor {
                name,
                age,
                gender,
                mobile,
                speciality,
                qualification,
                photo,
                ..
            } => {
                util::assert_length(&speciality, 2, "speciality")?;
                util::assert_length(&qualification, 2, "qualification")?;
                (
                    name,
                    age,
                    gender,
                    mobile,
                    None,
                    Some(speciality),
                    Some(qualification),
                    photo,
                )
            }
        };

        util::assert_length(&name, 2, "name")?;
        util::assert_age(age)?;
        medibook.config.booking.assert_mobile(&mobile)?;

        let email_normalised = util::normalise_email(email.clone());
        if medibook
            .database
            .find_account_by_normalised_email(&email_normalised)
            .await?
            .is_some()
        {
            return Err(Error::EmailInUse);
        }

        // The photo is stored before the account so a failed upload
        // leaves no state behind
        let photo = match photo {
            Some(attachment) => {
                medibook.config.booking.assert_attachment(&attachment)?;
                Some(medibook.storage.store(&attachment).await?)
            }
            None => None,
        };

        let account = Account {
            id: ulid::Ulid::new().to_string(),

            name,
            email,
            email_normalised,
            mobile,
            age,
            gender,
            role,
            secret,
            address,
            speciality,
            qualification,
            photo,

            listing_status: ListingStatus::None,
            verified: true,
        };

        // Final consumption of the code happens before the account write,
        // so a code expiring mid-flow cannot leave an account behind
        code.claim(medibook).await?;
        medibook.database.save_account(&account).await?;

        if let Some(template) = &medibook.config.templates.welcome {
            medibook
                .notify(
                    vec![account.email.clone()],
                    template,
                    json!({ "name": account.name, "role": account.role }),
                )
                .await;
        }

        medibook
            .publish_event(MedibookEvent::CreateAccount {
                account: account.clone(),
            })
            .await;

        Ok(account)
    }

    /// Log in to an account, producing a session
    pub async fn login(
        medibook: &Medibook,
        email: &str,
        secret: Option<&str>,
        session_name: String,
    ) -> Result<Session> {
        // Treat a malformed address like any other bad credential
        util::assert_email(email).map_err(|_| Error::InvalidCredentials)?;

        let email_normalised = util::normalise_email(email.to_string());

        let account = medibook
            .database
            .find_account_by_normalised_email(&email_normalised)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if medibook.config.secrets.required_for(account.role) {
            let secret = secret.ok_or(Error::InvalidCredentials)?;
            account.verify_secret(secret)?;
        }

        account.create_session(medibook, session_name).await
    }

    /// Create a new session
    pub async fn create_session(&self, medibook: &Medibook, name: String) -> Result<Session> {
        let session = Session {
            id: ulid::Ulid::new().to_string(),
            token: nanoid!(64),

            user_id: self.id.clone(),
            name,
        };

        session.save(medibook).await?;

        medibook
            .publish_event(MedibookEvent::CreateSession {
                session: session.clone(),
            })
            .await;

        Ok(session)
    }

    /// Verify the account's secret is correct
    pub fn verify_secret(&self, plaintext: &str) -> Success {
        let digest = self.secret.as_ref().ok_or(Error::InvalidCredentials)?;

        argon2::verify_encoded(digest, plaintext.as_bytes())
            .map(|v| {
                if v {
                    Ok(())
                } else {
                    Err(Error::InvalidCredentials)
                }
            })
            // To prevent user enumeration, we should ignore
            // the error and pretend the secret is wrong.
            .map_err(|_| Error::InvalidCredentials)?
    }

    /// Update the profile, propagating changes into the listing
    pub async fn update_profile(&mut self, medibook: &Medibook, data: ProfileUpdate) -> Success {
        util::assert_length(&data.name, 2, "name")?;
        util::assert_email(&data.email)?;
        medibook.config.booking.assert_mobile(&data.mobile)?;
        util::assert_age(data.age)?;

        match self.role {
            Role::Patient => {
                let address = data
                    .address
                    .as_deref()
                    .ok_or(Error::IncorrectData { with: "address" })?;
                util::assert_length(address, 5, "address")?;
            }
            Role::Doctor => {
                let speciality = data
                    .speciality
                    .as_deref()
                    .ok_or(Error::IncorrectData { with: "speciality" })?;
                util::assert_length(speciality, 2, "speciality")?;

                let qualification = data
                    .qualification
                    .as_deref()
                    .ok_or(Error::IncorrectData { with: "qualification" })?;
                util::assert_length(qualification, 2, "qualification")?;
            }
        }

        let email_normalised = util::normalise_email(data.email.clone());
        if email_normalised != self.email_normalised
            && medibook
                .database
                .find_account_by_normalised_email(&email_normalised)
                .await?
                .is_some()
        {
            return Err(Error::EmailInUse);
        }

        if let Some(attachment) = data.photo {
            medibook.config.booking.assert_attachment(&attachment)?;
            self.photo = Some(medibook.storage.store(&attachment).await?);
        }

        self.name = data.name;
        self.email = data.email;
        self.email_normalised = email_normalised;
        self.mobile = data.mobile;
        self.age = data.age;
        self.gender = data.gender;

        match self.role {
            Role::Patient => self.address = data.address,
            Role::Doctor => {
                self.speciality = data.speciality;
                self.qualification = data.qualification;
            }
        }

        // Refresh the listing's denormalised copy; where the refreshed
        // listing lands is the moderation hook's call
        if let Role::Doctor = self.role {
            if medibook.database.find_listing(&self.id).await?.is_some() {
                let mut listing = DoctorListing::from_account(self)?;
                listing.status = medibook.config.moderation.decide(&listing);

                medibook.database.save_listing(&listing).await?;
                self.listing_status = listing.status;

                medibook
                    .publish_event(MedibookEvent::ListingStatusChanged {
                        doctor_id: self.id.clone(),
                        status: listing.status,
                    })
                    .await;
            } else {
                self.listing_status = ListingStatus::None;
            }
        }

        medibook.database.save_account(self).await
    }

    /// Change the account's secret
    pub async fn change_secret(
        &mut self,
        medibook: &Medibook,
        current: &str,
        new: String,
    ) -> Success {
        if self.secret.is_none() && !medibook.config.secrets.required_for(self.role) {
            return Err(Error::OperationFailed);
        }

        self.verify_secret(current)?;

        if new.len() < 6 {
            return Err(Error::ShortSecret);
        }

        self.secret = Some(util::hash_secret(new)?);
        medibook.database.save_account(self).await
    }

    fn prepare_secret(
        medibook: &Medibook,
        role: Role,
        secret: Option<String>,
    ) -> Result<Option<String>> {
        match secret {
            Some(plaintext) => {
                if plaintext.len() < 6 {
                    return Err(Error::ShortSecret);
                }

                Ok(Some(util::hash_secret(plaintext)?))
            }
            None => {
                if medibook.config.secrets.required_for(role) {
                    Err(Error::MissingSecret)
                } else {
                    Ok(None)
                }
            }
        }
    }
}
