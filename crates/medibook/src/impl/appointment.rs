use chrono::NaiveDate;

use crate::{
    guard::Identity,
    models::{
        Appointment, AppointmentAction, AppointmentStatus, Gender, ListingStatus, PatientDetails,
        Role, StatusChange,
    },
    storage::Attachment,
    util, Error, Medibook, MedibookEvent, Result,
};

/// Booking form
///
/// Patient details here are self-reported and frozen onto the record;
/// they are allowed to differ from the account profile.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub previous_treatment: Option<String>,
    pub remarks: Option<String>,
    pub certificate: Option<Attachment>,
}

impl Appointment {
    /// Book an appointment with a listed doctor
    pub async fn book(
        medibook: &Medibook,
        identity: &Identity,
        request: BookingRequest,
    ) -> Result<Appointment> {
        if !matches!(identity.role, Role::Patient) {
            return Err(Error::Forbidden);
        }

        let booking = &medibook.config.booking;
        util::assert_length(&request.name, 2, "name")?;
        util::assert_age(request.age)?;
        util::assert_email(&request.email)?;
        booking.assert_mobile(&request.mobile)?;
        util::assert_length(&request.address, 5, "address")?;
        util::assert_length(&request.reason, 5, "reason")?;
        util::assert_length(&request.time, 1, "time")?;
        booking.assert_within_window(request.date)?;

        if let Some(attachment) = &request.certificate {
            booking.assert_attachment(attachment)?;
        }

        // The listing record is the canonical visibility gate, not the
        // cached status on the account
        let doctor = match medibook.database.find_account(&request.doctor_id).await {
            Err(Error::UnknownUser) => return Err(Error::UnlistedDoctor),
            result => result?,
        };

        if !matches!(doctor.role, Role::Doctor) {
            return Err(Error::UnlistedDoctor);
        }

        let listing = medibook
            .database
            .find_listing(&doctor.id)
            .await?
            .ok_or(Error::UnlistedDoctor)?;

        if !matches!(listing.status, ListingStatus::Accepted) {
            return Err(Error::UnlistedDoctor);
        }

        // Stored before the record exists so a failed upload aborts
        // without leaving state behind
        let certificate = match &request.certificate {
            Some(attachment) => Some(medibook.storage.store(attachment).await?),
            None => None,
        };

        let appointment = Appointment {
            id: ulid::Ulid::new().to_string(),

            patient_id: identity.account_id.clone(),
            doctor_id: doctor.id.clone(),

            patient: PatientDetails {
                name: request.name,
                age: request.age,
                gender: request.gender,
                email: request.email,
                mobile: request.mobile,
                address: request.address,
            },

            doctor_name: listing.name.clone(),
            doctor_email: listing.email.clone(),
            doctor_speciality: listing.speciality.clone(),

            date: request.date,
            time: request.time,
            reason: request.reason,
            previous_treatment: request.previous_treatment,
            remarks: request.remarks,
            certificate,

            status: AppointmentStatus::Pending,
        };

        medibook.database.save_appointment(&appointment).await?;

        appointment.notify_parties(medibook).await;
        medibook
            .publish_event(MedibookEvent::AppointmentBooked {
                appointment: appointment.clone(),
            })
            .await;

        Ok(appointment)
    }

    /// Fetch an appointment the caller is a party to
    pub async fn fetch(medibook: &Medibook, identity: &Identity, id: &str) -> Result<Appointment> {
        let appointment = medibook.database.find_appointment(id).await?;
        identity.assert_party(&appointment)?;

        Ok(appointment)
    }

    /// List appointments where the caller is either party
    pub async fn find_for(medibook: &Medibook, identity: &Identity) -> Result<Vec<Appointment>> {
        medibook
            .database
            .find_appointments_for(&identity.account_id)
            .await
    }

    /// Confirm a pending or rescheduled appointment
    pub async fn accept(medibook: &Medibook, identity: &Identity, id: &str) -> Result<Appointment> {
        let appointment = medibook.database.find_appointment(id).await?;
        identity.assert_may_accept(&appointment)?;

        appointment
            .transition(
                medibook,
                AppointmentAction::Accept,
                StatusChange {
                    status: AppointmentStatus::Confirmed,
                    date: None,
                    time: None,
                },
            )
            .await
    }

    /// Turn down a pending or rescheduled appointment
    pub async fn reject(medibook: &Medibook, identity: &Identity, id: &str) -> Result<Appointment> {
        let appointment = medibook.database.find_appointment(id).await?;
        identity.assert_may_reject(&appointment, &medibook.config.rejection)?;

        appointment
            .transition(
                medibook,
                AppointmentAction::Reject,
                StatusChange {
                    status: AppointmentStatus::Rejected,
                    date: None,
                    time: None,
                },
            )
            .await
    }

    /// Move an appointment to a new date and slot
    pub async fn reschedule(
        medibook: &Medibook,
        identity: &Identity,
        id: &str,
        date: NaiveDate,
        time: String,
    ) -> Result<Appointment> {
        let appointment = medibook.database.find_appointment(id).await?;
        identity.assert_may_reschedule(&appointment)?;

        medibook.config.booking.assert_within_window(date)?;
        util::assert_length(&time, 1, "time")?;

        appointment
            .transition(
                medibook,
                AppointmentAction::Reschedule,
                StatusChange {
                    status: AppointmentStatus::Rescheduled,
                    date: Some(date),
                    time: Some(time),
                },
            )
            .await
    }

    /// Withdraw a booking entirely
    pub async fn cancel(medibook: &Medibook, identity: &Identity, id: &str) -> Result<Appointment> {
        let appointment = medibook.database.find_appointment(id).await?;
        identity.assert_may_cancel(&appointment)?;

        if !medibook.config.cancellation {
            return Err(Error::IllegalTransition);
        }

        appointment
            .transition(
                medibook,
                AppointmentAction::Cancel,
                StatusChange {
                    status: AppointmentStatus::Cancelled,
                    date: None,
                    time: None,
                },
            )
            .await
    }

    /// Run one legality-checked, conditionally persisted transition
    async fn transition(
        self,
        medibook: &Medibook,
        action: AppointmentAction,
        change: StatusChange,
    ) -> Result<Appointment> {
        if !self.status.may(action) {
            return Err(Error::IllegalTransition);
        }

        // Conditional on the status we just read; of two racing
        // transitions exactly one finds it unchanged and wins
        let appointment = medibook
            .database
            .transition_appointment(&self.id, self.status, change)
            .await?;

        appointment.notify_parties(medibook).await;
        medibook
            .publish_event(MedibookEvent::AppointmentTransition {
                appointment: appointment.clone(),
            })
            .await;

        Ok(appointment)
    }

    /// One delivery attempt per party, after commit
    ///
    /// Dispatch failure is logged inside `notify` and never rolls back or
    /// fails the transition that triggered it.
    async fn notify_parties(&self, medibook: &Medibook) {
        medibook
            .notify(
                vec![self.patient.email.clone(), self.doctor_email.clone()],
                medibook.config.templates.for_status(self.status),
                json!({
                    "patient_name": self.patient.name,
                    "doctor_name": self.doctor_name,
                    "doctor_speciality": self.doctor_speciality,
                    "date": self.date.to_string(),
                    "time": self.time,
                    "status": self.status,
                }),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use crate::test::*;

    async fn booked(
        medibook: &Medibook,
    ) -> (Account, Account, Appointment) {
        let patient = register_patient(medibook, "asha@example.com").await;
        let doctor = listed_doctor(medibook, "vikram@example.com").await;

        let appointment = Appointment::book(
            medibook,
            &identity_of(&patient),
            booking_request(&doctor.id),
        )
        .await
        .unwrap();

        (patient, doctor, appointment)
    }

    #[async_std::test]
    async fn booking_happy_path() {
        let (medibook, receiver) = for_test().await;
        let patient = register_patient(&medibook, "asha@example.com").await;
        let doctor = listed_doctor(&medibook, "vikram@example.com").await;
        drain(&receiver);
        clear_outbox(&medibook).await;

        let appointment = Appointment::book(
            &medibook,
            &identity_of(&patient),
            booking_request(&doctor.id),
        )
        .await
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.patient_id, patient.id);
        assert_eq!(appointment.doctor_id, doctor.id);
        assert_eq!(appointment.doctor_name, doctor.name);

        assert!(matches!(
            receiver.try_recv().unwrap(),
            MedibookEvent::AppointmentBooked { .. }
        ));

        // One attempt per party
        settle().await;
        let mails = outbox(&medibook).await;
        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].to, "asha@example.com");
        assert_eq!(mails[1].to, "vikram@example.com");

        // The patient booking it does not make them the doctor
        assert_eq!(
            Appointment::accept(&medibook, &identity_of(&patient), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );
    }

    #[async_std::test]
    async fn booking_requires_an_accepted_listing() {
        let (medibook, _receiver) = for_test().await;
        let patient = register_patient(&medibook, "asha@example.com").await;

        // Doctor without any listing
        let unlisted = register_doctor(&medibook, "vikram@example.com").await;
        assert_eq!(
            Appointment::book(
                &medibook,
                &identity_of(&patient),
                booking_request(&unlisted.id)
            )
            .await
            .unwrap_err(),
            Error::UnlistedDoctor
        );

        // Unknown doctor id
        assert_eq!(
            Appointment::book(&medibook, &identity_of(&patient), booking_request("ghost"))
                .await
                .unwrap_err(),
            Error::UnlistedDoctor
        );

        // Another patient is not a doctor
        let other = register_patient(&medibook, "meera@example.com").await;
        assert_eq!(
            Appointment::book(
                &medibook,
                &identity_of(&patient),
                booking_request(&other.id)
            )
            .await
            .unwrap_err(),
            Error::UnlistedDoctor
        );

        // A listing still waiting on moderation is not bookable either
        let config = Config {
            moderation: ModerationPolicy::Queue,
            ..Default::default()
        };
        let (medibook, _receiver) = for_test_with_config(config).await;
        let patient = register_patient(&medibook, "asha@example.com").await;
        let mut pending = register_doctor(&medibook, "vikram@example.com").await;
        DoctorListing::submit(&medibook, &mut pending).await.unwrap();

        assert_eq!(
            Appointment::book(
                &medibook,
                &identity_of(&patient),
                booking_request(&pending.id)
            )
            .await
            .unwrap_err(),
            Error::UnlistedDoctor
        );
    }

    #[async_std::test]
    async fn booking_is_patient_only() {
        let (medibook, _receiver) = for_test().await;
        let doctor = listed_doctor(&medibook, "vikram@example.com").await;

        assert_eq!(
            Appointment::book(
                &medibook,
                &identity_of(&doctor),
                booking_request(&doctor.id)
            )
            .await
            .unwrap_err(),
            Error::Forbidden
        );
    }

    #[async_std::test]
    async fn booking_window_boundaries() {
        let (medibook, _receiver) = for_test().await;
        let patient = register_patient(&medibook, "asha@example.com").await;
        let doctor = listed_doctor(&medibook, "vikram@example.com").await;
        let identity = identity_of(&patient);

        let today = chrono::Local::now().date_naive();
        let max = today
            .checked_add_months(chrono::Months::new(2))
            .unwrap();

        for date in [today, max] {
            let mut request = booking_request(&doctor.id);
            request.date = date;
            Appointment::book(&medibook, &identity, request).await.unwrap();
        }

        for date in [today.pred_opt().unwrap(), max.succ_opt().unwrap()] {
            let mut request = booking_request(&doctor.id);
            request.date = date;
            assert_eq!(
                Appointment::book(&medibook, &identity, request)
                    .await
                    .unwrap_err(),
                Error::OutsideBookingWindow
            );
        }
    }

    #[async_std::test]
    async fn booking_validates_fields() {
        let (medibook, _receiver) = for_test().await;
        let patient = register_patient(&medibook, "asha@example.com").await;
        let doctor = listed_doctor(&medibook, "vikram@example.com").await;
        let identity = identity_of(&patient);

        let mut request = booking_request(&doctor.id);
        request.reason = "sore".into();
        assert_eq!(
            Appointment::book(&medibook, &identity, request)
                .await
                .unwrap_err(),
            Error::IncorrectData { with: "reason" }
        );

        let mut request = booking_request(&doctor.id);
        request.mobile = "12345".into();
        assert_eq!(
            Appointment::book(&medibook, &identity, request)
                .await
                .unwrap_err(),
            Error::IncorrectData { with: "mobile" }
        );

        let mut request = booking_request(&doctor.id);
        request.certificate = Some(Attachment {
            data: vec![0; 2 * 1024 * 1024],
            content_type: "image/png".into(),
        });
        assert_eq!(
            Appointment::book(&medibook, &identity, request)
                .await
                .unwrap_err(),
            Error::AttachmentTooLarge
        );

        let mut request = booking_request(&doctor.id);
        request.certificate = Some(Attachment {
            data: vec![0; 64],
            content_type: "application/pdf".into(),
        });
        assert_eq!(
            Appointment::book(&medibook, &identity, request)
                .await
                .unwrap_err(),
            Error::UnsupportedAttachment
        );

        // A valid certificate lands in the file store
        let mut request = booking_request(&doctor.id);
        request.certificate = Some(Attachment {
            data: vec![0; 64],
            content_type: "image/png".into(),
        });
        let appointment = Appointment::book(&medibook, &identity, request)
            .await
            .unwrap();
        assert!(appointment.certificate.is_some());
    }

    #[async_std::test]
    async fn accept_is_doctor_only_and_not_repeatable() {
        let (medibook, receiver) = for_test().await;
        let (_patient, doctor, appointment) = booked(&medibook).await;
        drain(&receiver);

        let confirmed = Appointment::accept(&medibook, &identity_of(&doctor), &appointment.id)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        assert!(matches!(
            receiver.try_recv().unwrap(),
            MedibookEvent::AppointmentTransition { .. }
        ));

        // Accepting an already confirmed appointment is a conflict, not
        // a silent success
        assert_eq!(
            Appointment::accept(&medibook, &identity_of(&doctor), &appointment.id)
                .await
                .unwrap_err(),
            Error::IllegalTransition
        );
    }

    #[async_std::test]
    async fn racing_transitions_have_one_winner() {
        let (medibook, _receiver) = for_test().await;
        let (_patient, doctor, appointment) = booked(&medibook).await;

        let mut tasks = Vec::new();
        for _ in 0..2 {
            let medibook = medibook.clone();
            let identity = identity_of(&doctor);
            let id = appointment.id.clone();
            tasks.push(async_std::task::spawn(async move {
                Appointment::accept(&medibook, &identity, &id).await
            }));
        }

        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await);
        }

        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|outcome| matches!(outcome, Err(Error::IllegalTransition)))
                .count(),
            1
        );
    }

    #[async_std::test]
    async fn reject_follows_the_configured_policy() {
        let (medibook, _receiver) = for_test().await;
        let (patient, _doctor, appointment) = booked(&medibook).await;

        // Either owner may reject by default
        let rejected = Appointment::reject(&medibook, &identity_of(&patient), &appointment.id)
            .await
            .unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Rejected);

        // Rejected is terminal
        assert_eq!(
            Appointment::reject(&medibook, &identity_of(&patient), &appointment.id)
                .await
                .unwrap_err(),
            Error::IllegalTransition
        );

        // Under the strict policy the patient is shut out
        let config = Config {
            rejection: RejectPolicy::DoctorOnly,
            ..Default::default()
        };
        let (medibook, _receiver) = for_test_with_config(config).await;
        let (patient, doctor, appointment) = booked(&medibook).await;

        assert_eq!(
            Appointment::reject(&medibook, &identity_of(&patient), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );
        Appointment::reject(&medibook, &identity_of(&doctor), &appointment.id)
            .await
            .unwrap();
    }

    #[async_std::test]
    async fn outsiders_cannot_touch_the_record() {
        let (medibook, _receiver) = for_test().await;
        let (_patient, _doctor, appointment) = booked(&medibook).await;
        let outsider = register_patient(&medibook, "meera@example.com").await;

        assert_eq!(
            Appointment::accept(&medibook, &identity_of(&outsider), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );
        assert_eq!(
            Appointment::reject(&medibook, &identity_of(&outsider), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );
        assert_eq!(
            Appointment::fetch(&medibook, &identity_of(&outsider), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );
    }

    #[async_std::test]
    async fn reschedule_is_open_to_both_parties() {
        let (medibook, _receiver) = for_test().await;
        let (patient, doctor, appointment) = booked(&medibook).await;

        let date = chrono::Local::now().date_naive() + chrono::Duration::days(14);
        let rescheduled = Appointment::reschedule(
            &medibook,
            &identity_of(&patient),
            &appointment.id,
            date,
            "14:00".into(),
        )
        .await
        .unwrap();
        assert_eq!(rescheduled.status, AppointmentStatus::Rescheduled);
        assert_eq!(rescheduled.date, date);
        assert_eq!(rescheduled.time, "14:00");

        // Confirmed appointments can still be moved
        let confirmed = Appointment::accept(&medibook, &identity_of(&doctor), &appointment.id)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let date = chrono::Local::now().date_naive() + chrono::Duration::days(21);
        Appointment::reschedule(
            &medibook,
            &identity_of(&doctor),
            &appointment.id,
            date,
            "09:00".into(),
        )
        .await
        .unwrap();

        // The new date still has to sit in the window
        let outside = chrono::Local::now().date_naive() + chrono::Duration::days(120);
        assert_eq!(
            Appointment::reschedule(
                &medibook,
                &identity_of(&doctor),
                &appointment.id,
                outside,
                "09:00".into(),
            )
            .await
            .unwrap_err(),
            Error::OutsideBookingWindow
        );
    }

    #[async_std::test]
    async fn cancel_is_patient_only_and_flag_gated() {
        let (medibook, _receiver) = for_test().await;
        let (patient, doctor, appointment) = booked(&medibook).await;

        assert_eq!(
            Appointment::cancel(&medibook, &identity_of(&doctor), &appointment.id)
                .await
                .unwrap_err(),
            Error::Forbidden
        );

        let cancelled = Appointment::cancel(&medibook, &identity_of(&patient), &appointment.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        // Cancelled is terminal
        assert_eq!(
            Appointment::reschedule(
                &medibook,
                &identity_of(&patient),
                &appointment.id,
                chrono::Local::now().date_naive() + chrono::Duration::days(7),
                "11:00".into(),
            )
            .await
            .unwrap_err(),
            Error::IllegalTransition
        );

        // With the flag off the action is not available at all
        let config = Config {
            cancellation: false,
            ..Default::default()
        };
        let (medibook, _receiver) = for_test_with_config(config).await;
        let (patient, _doctor, appointment) = booked(&medibook).await;

        assert_eq!(
            Appointment::cancel(&medibook, &identity_of(&patient), &appointment.id)
                .await
                .unwrap_err(),
            Error::IllegalTransition
        );
    }

    #[async_std::test]
    async fn every_transition_notifies_both_parties() {
        let (medibook, _receiver) = for_test().await;
        let (patient, doctor, appointment) = booked(&medibook).await;

        settle().await;
        clear_outbox(&medibook).await;

        Appointment::accept(&medibook, &identity_of(&doctor), &appointment.id)
            .await
            .unwrap();
        settle().await;

        let mails = outbox(&medibook).await;
        assert_eq!(mails.len(), 2);
        assert!(mails.iter().all(|mail| mail.subject == "Appointment confirmed"));
        assert!(mails.iter().any(|mail| mail.to == "asha@example.com"));
        assert!(mails.iter().any(|mail| mail.to == "vikram@example.com"));

        clear_outbox(&medibook).await;
        Appointment::reschedule(
            &medibook,
            &identity_of(&patient),
            &appointment.id,
            chrono::Local::now().date_naive() + chrono::Duration::days(5),
            "16:00".into(),
        )
        .await
        .unwrap();
        settle().await;

        let mails = outbox(&medibook).await;
        assert_eq!(mails.len(), 2);
        assert!(mails
            .iter()
            .all(|mail| mail.subject == "Appointment rescheduled"));
    }

    #[async_std::test]
    async fn both_parties_see_the_record() {
        let (medibook, _receiver) = for_test().await;
        let (patient, doctor, appointment) = booked(&medibook).await;

        for account in [&patient, &doctor] {
            let own = Appointment::find_for(&medibook, &identity_of(account))
                .await
                .unwrap();
            assert_eq!(own.len(), 1);
            assert_eq!(own[0].id, appointment.id);
        }

        Appointment::fetch(&medibook, &identity_of(&patient), &appointment.id)
            .await
            .unwrap();
    }

    #[async_std::test]
    async fn snapshot_survives_profile_edits() {
        let (medibook, _receiver) = for_test().await;
        let (mut patient, _doctor, appointment) = booked(&medibook).await;

        let update = ProfileUpdate {
            name: "Asha R. Menon".into(),
            email: "asha@example.com".into(),
            mobile: "9876543210".into(),
            age: 35,
            gender: Gender::Female,
            address: Some("99 New Address Lane".into()),
            speciality: None,
            qualification: None,
            photo: None,
        };
        patient.update_profile(&medibook, update).await.unwrap();

        // The booking keeps the details entered at booking time
        let stored = medibook
            .database
            .find_appointment(&appointment.id)
            .await
            .unwrap();
        assert_eq!(stored.patient.name, "Asha Rao");
        assert_eq!(stored.patient.address, "12 Lakeview Road");
    }
}
