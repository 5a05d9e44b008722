use bson::{to_bson, to_document};
use futures::stream::TryStreamExt;
use mongodb::options::{
    Collation, CollationStrength, FindOneAndUpdateOptions, FindOneOptions, ReturnDocument,
    UpdateOptions,
};
use std::ops::Deref;

use crate::{
    models::{
        Account, Appointment, AppointmentStatus, DoctorListing, Session, StatusChange,
        VerificationCode,
    },
    Error, Result, Success,
};

use super::{definition::AbstractDatabase, Migration};

#[derive(Clone)]
pub struct MongoDb(pub mongodb::Database);

impl Deref for MongoDb {
    type Target = mongodb::Database;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl AbstractDatabase for MongoDb {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success {
        match migration {
            #[cfg(debug_assertions)]
            Migration::WipeAll => {
                // Drop the entire database
                self.drop(None).await.unwrap();
            }
            Migration::M2025_08_01EnsureIndexes => {
                // Make sure all collections exist
                let list = self.list_collection_names(None).await.unwrap();
                let collections = [
                    "accounts",
                    "verification_codes",
                    "sessions",
                    "listings",
                    "appointments",
                ];

                for name in collections {
                    if !list.contains(&name.to_string()) {
                        self.create_collection(name, None).await.unwrap();
                    }
                }

                // Email uniqueness is enforced here, across all roles
                self.run_command(
                    doc! {
                        "createIndexes": "accounts",
                        "indexes": [
                            {
                                "key": {
                                    "email_normalised": 1
                                },
                                "name": "email_normalised",
                                "unique": true,
                                "collation": {
                                    "locale": "en",
                                    "strength": 2
                                }
                            }
                        ]
                    },
                    None,
                )
                .await
                .unwrap();

                self.run_command(
                    doc! {
                        "createIndexes": "sessions",
                        "indexes": [
                            {
                                "key": {
                                    "token": 1
                                },
                                "name": "token",
                                "unique": true
                            },
                            {
                                "key": {
                                    "user_id": 1
                                },
                                "name": "user_id"
                            }
                        ]
                    },
                    None,
                )
                .await
                .unwrap();

                self.run_command(
                    doc! {
                        "createIndexes": "listings",
                        "indexes": [
                            {
                                "key": {
                                    "status": 1
                                },
                                "name": "status"
                            }
                        ]
                    },
                    None,
                )
                .await
                .unwrap();

                self.run_command(
                    doc! {
                        "createIndexes": "appointments",
                        "indexes": [
                            {
                                "key": {
                                    "patient_id": 1
                                },
                                "name": "patient_id"
                            },
                            {
                                "key": {
                                    "doctor_id": 1
                                },
                                "name": "doctor_id"
                            }
                        ]
                    },
                    None,
                )
                .await
                .unwrap();
            }
        }

        Ok(())
    }

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account> {
        self.collection("accounts")
            .find_one(
                doc! {
                    "_id": id
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "account",
            })?
            .ok_or(Error::UnknownUser)
    }

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>> {
        self.collection("accounts")
            .find_one(
                doc! {
                    "email_normalised": normalised_email
                },
                FindOneOptions::builder()
                    .collation(
                        Collation::builder()
                            .locale("en")
                            .strength(CollationStrength::Secondary)
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "account",
            })
    }

    /// Save account
    async fn save_account(&self, account: &Account) -> Success {
        self.collection::<Account>("accounts")
            .update_one(
                doc! {
                    "_id": &account.id
                },
                doc! {
                    "$set": to_document(account).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "account",
                    })?
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "account",
            })
            .map(|_| ())
    }

    /// Find the live verification code for an email, if any
    async fn find_verification_code(&self, email: &str) -> Result<Option<VerificationCode>> {
        self.collection("verification_codes")
            .find_one(
                doc! {
                    "_id": email
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "verification_code",
            })
    }

    /// Save verification code, replacing any previous code for the email
    async fn save_verification_code(&self, code: &VerificationCode) -> Success {
        self.collection::<VerificationCode>("verification_codes")
            .update_one(
                doc! {
                    "_id": &code.email
                },
                doc! {
                    "$set": to_document(code).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "verification_code",
                    })?
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "verification_code",
            })
            .map(|_| ())
    }

    /// Delete verification code
    async fn delete_verification_code(&self, email: &str) -> Success {
        self.collection::<VerificationCode>("verification_codes")
            .delete_one(
                doc! {
                    "_id": email
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "delete_one",
                with: "verification_code",
            })
            .map(|_| ())
    }

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session> {
        self.collection("sessions")
            .find_one(
                doc! {
                    "_id": id
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "session",
            })?
            .ok_or(Error::InvalidSession)
    }

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        self.collection("sessions")
            .find_one(
                doc! {
                    "token": token
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "session",
            })
    }

    /// Save session
    async fn save_session(&self, session: &Session) -> Success {
        self.collection::<Session>("sessions")
            .update_one(
                doc! {
                    "_id": &session.id
                },
                doc! {
                    "$set": to_document(session).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "session",
                    })?
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "session",
            })
            .map(|_| ())
    }

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success {
        self.collection::<Session>("sessions")
            .delete_one(
                doc! {
                    "_id": id
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "delete_one",
                with: "session",
            })
            .map(|_| ())
    }

    /// Find a doctor's listing, if any
    async fn find_listing(&self, doctor_id: &str) -> Result<Option<DoctorListing>> {
        self.collection("listings")
            .find_one(
                doc! {
                    "_id": doctor_id
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "listing",
            })
    }

    /// Find all accepted listings
    async fn find_accepted_listings(&self) -> Result<Vec<DoctorListing>> {
        self.collection::<DoctorListing>("listings")
            .find(
                doc! {
                    "status": "accepted"
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find",
                with: "listings",
            })?
            .try_collect()
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "collect",
                with: "listings",
            })
    }

    /// Save listing
    async fn save_listing(&self, listing: &DoctorListing) -> Success {
        self.collection::<DoctorListing>("listings")
            .update_one(
                doc! {
                    "_id": &listing.doctor_id
                },
                doc! {
                    "$set": to_document(listing).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "listing",
                    })?
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "listing",
            })
            .map(|_| ())
    }

    /// Find appointment by id
    async fn find_appointment(&self, id: &str) -> Result<Appointment> {
        self.collection("appointments")
            .find_one(
                doc! {
                    "_id": id
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "appointment",
            })?
            .ok_or(Error::UnknownAppointment)
    }

    /// Find appointments where the account is either party
    async fn find_appointments_for(&self, account_id: &str) -> Result<Vec<Appointment>> {
        self.collection::<Appointment>("appointments")
            .find(
                doc! {
                    "$or": [
                        {
                            "patient_id": account_id
                        },
                        {
                            "doctor_id": account_id
                        }
                    ]
                },
                None,
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find",
                with: "appointments",
            })?
            .try_collect()
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "collect",
                with: "appointments",
            })
    }

    /// Save appointment
    async fn save_appointment(&self, appointment: &Appointment) -> Success {
        self.collection::<Appointment>("appointments")
            .update_one(
                doc! {
                    "_id": &appointment.id
                },
                doc! {
                    "$set": to_document(appointment).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "appointment",
                    })?
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "appointment",
            })
            .map(|_| ())
    }

    /// Apply a status change if the record still carries `expected`
    ///
    /// The conditional filter on `status` is what turns concurrent
    /// conflicting transitions into exactly one winner.
    async fn transition_appointment(
        &self,
        id: &str,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Appointment> {
        let serialize = |_| Error::DatabaseError {
            operation: "to_bson",
            with: "appointment",
        };

        let mut update = doc! {
            "status": to_bson(&change.status).map_err(serialize)?
        };

        if let Some(date) = change.date {
            update.insert("date", to_bson(&date).map_err(serialize)?);
        }

        if let Some(time) = change.time {
            update.insert("time", time);
        }

        let appointment = self
            .collection::<Appointment>("appointments")
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "status": to_bson(&expected).map_err(serialize)?
                },
                doc! {
                    "$set": update
                },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one_and_update",
                with: "appointment",
            })?;

        match appointment {
            Some(appointment) => Ok(appointment),
            // Either the record is gone or another transition won the race
            None => match self.find_appointment(id).await {
                Ok(_) => Err(Error::IllegalTransition),
                Err(err) => Err(err),
            },
        }
    }
}
