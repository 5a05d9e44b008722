use crate::{
    models::{Account, DoctorListing, ListingStatus, Role},
    Error, Medibook, MedibookEvent, Result,
};

impl DoctorListing {
    /// Build a listing from the owning account's current profile
    pub fn from_account(account: &Account) -> Result<DoctorListing> {
        if !matches!(account.role, Role::Doctor) {
            return Err(Error::NotDoctor);
        }

        Ok(DoctorListing {
            doctor_id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            mobile: account.mobile.clone(),
            age: account.age,
            gender: account.gender,
            speciality: account
                .speciality
                .clone()
                .ok_or(Error::IncorrectData { with: "speciality" })?,
            qualification: account
                .qualification
                .clone()
                .ok_or(Error::IncorrectData { with: "qualification" })?,
            photo: account.photo.clone(),
            status: ListingStatus::None,
        })
    }

    /// Create or refresh the caller's listing
    ///
    /// Accepted listings are immutable through this path; profile updates
    /// refresh them instead. Where a submission lands is decided by the
    /// moderation policy, and the verdict is mirrored onto the account.
    pub async fn submit(medibook: &Medibook, account: &mut Account) -> Result<DoctorListing> {
        if !matches!(account.role, Role::Doctor) {
            return Err(Error::NotDoctor);
        }

        if let Some(listing) = medibook.database.find_listing(&account.id).await? {
            if let ListingStatus::Accepted = listing.status {
                return Err(Error::ListingLocked);
            }
        }

        let mut listing = DoctorListing::from_account(account)?;
        listing.status = medibook.config.moderation.decide(&listing);

        medibook.database.save_listing(&listing).await?;

        account.listing_status = listing.status;
        medibook.database.save_account(account).await?;

        medibook
            .publish_event(MedibookEvent::ListingStatusChanged {
                doctor_id: listing.doctor_id.clone(),
                status: listing.status,
            })
            .await;

        Ok(listing)
    }

    /// Fetch a listing which must exist
    pub async fn fetch(medibook: &Medibook, doctor_id: &str) -> Result<DoctorListing> {
        medibook
            .database
            .find_listing(doctor_id)
            .await?
            .ok_or(Error::UnknownListing)
    }

    /// Every accepted listing, for public directory consumption
    ///
    /// Side-effect free and open to anyone, no authentication involved.
    pub async fn directory(medibook: &Medibook) -> Result<Vec<DoctorListing>> {
        medibook.database.find_accepted_listings().await
    }

    /// Moderation verdict: make a pending listing public
    pub async fn approve(self, medibook: &Medibook) -> Result<DoctorListing> {
        self.resolve(medibook, ListingStatus::Accepted).await
    }

    /// Moderation verdict: keep a pending listing off the directory
    ///
    /// The doctor may resubmit, which flips the listing back to pending.
    pub async fn decline(self, medibook: &Medibook) -> Result<DoctorListing> {
        self.resolve(medibook, ListingStatus::Rejected).await
    }

    async fn resolve(mut self, medibook: &Medibook, status: ListingStatus) -> Result<DoctorListing> {
        if !matches!(self.status, ListingStatus::Pending) {
            return Err(Error::IllegalTransition);
        }

        self.status = status;
        medibook.database.save_listing(&self).await?;

        // Keep the account's cache in step
        let mut account = medibook.database.find_account(&self.doctor_id).await?;
        account.listing_status = status;
        medibook.database.save_account(&account).await?;

        medibook
            .publish_event(MedibookEvent::ListingStatusChanged {
                doctor_id: self.doctor_id.clone(),
                status,
            })
            .await;

        Ok(self)
    }

    /// Resolve a doctor's current listing status, healing the cache
    ///
    /// A listing deleted out-of-band reads as `none`; a drifted account
    /// cache is rewritten on the spot.
    pub async fn status_of(medibook: &Medibook, account: &mut Account) -> Result<ListingStatus> {
        if !matches!(account.role, Role::Doctor) {
            return Err(Error::NotDoctor);
        }

        let status = match medibook.database.find_listing(&account.id).await? {
            Some(listing) => listing.status,
            None => ListingStatus::None,
        };

        if account.listing_status != status {
            account.listing_status = status;
            medibook.database.save_account(account).await?;
        }

        Ok(status)
    }
}
