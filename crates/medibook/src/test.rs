pub use crate::{
    config::*,
    database::Database,
    dispatcher::{Dispatcher, Mail},
    models::*,
    r#impl::*,
    storage::{Attachment, FileStore},
    Config, Error, Identity, Medibook, MedibookEvent,
};

use async_std::channel::{unbounded, Receiver};

pub async fn for_test_with_config(config: Config) -> (Medibook, Receiver<MedibookEvent>) {
    let (sender, receiver) = unbounded();

    (
        Medibook {
            config,
            database: Database::default(),
            dispatcher: Dispatcher::default(),
            storage: FileStore::default(),
            event_channel: Some(sender),
        },
        receiver,
    )
}

pub async fn for_test() -> (Medibook, Receiver<MedibookEvent>) {
    for_test_with_config(Config::default()).await
}

/// Give spawned notification tasks a moment to land
pub async fn settle() {
    async_std::task::sleep(std::time::Duration::from_millis(50)).await;
}

/// Recorded delivery attempts so far
pub async fn outbox(medibook: &Medibook) -> Vec<Mail> {
    match &medibook.dispatcher {
        Dispatcher::Dummy(dummy) => dummy.outbox.lock().await.clone(),
        _ => Vec::new(),
    }
}

pub async fn clear_outbox(medibook: &Medibook) {
    if let Dispatcher::Dummy(dummy) = &medibook.dispatcher {
        dummy.outbox.lock().await.clear();
    }
}

/// Drop events accumulated so far
pub fn drain(receiver: &Receiver<MedibookEvent>) {
    while receiver.try_recv().is_ok() {}
}

pub fn identity_of(account: &Account) -> Identity {
    Identity {
        account_id: account.id.clone(),
        role: account.role,
    }
}

pub fn patient_data() -> RegistrationData {
    RegistrationData::Patient {
        name: "Asha Rao".into(),
        age: 34,
        gender: Gender::Female,
        mobile: "9876543210".into(),
        address: "12 Lakeview Road".into(),
        secret: Some("password_insecure".into()),
        photo: None,
    }
}

pub fn doctor_data() -> RegistrationData {
    RegistrationData::Doctor {
        name: "Vikram Shetty".into(),
        age: 45,
        gender: Gender::Male,
        mobile: "9123456780".into(),
        speciality: "Cardiology".into(),
        qualification: "MBBS, MD".into(),
        secret: None,
        photo: None,
    }
}

pub async fn register_with(medibook: &Medibook, email: &str, data: RegistrationData) -> Account {
    let code = VerificationCode::issue(medibook, email.to_string(), data.role())
        .await
        .unwrap();

    Account::register(medibook, email.to_string(), &code.code, data)
        .await
        .unwrap()
}

pub async fn register_patient(medibook: &Medibook, email: &str) -> Account {
    register_with(medibook, email, patient_data()).await
}

pub async fn register_doctor(medibook: &Medibook, email: &str) -> Account {
    register_with(medibook, email, doctor_data()).await
}

/// Register a doctor and put their listing on the public directory
pub async fn listed_doctor(medibook: &Medibook, email: &str) -> Account {
    let mut doctor = register_doctor(medibook, email).await;
    DoctorListing::submit(medibook, &mut doctor).await.unwrap();
    doctor
}

pub fn booking_request(doctor_id: &str) -> BookingRequest {
    BookingRequest {
        doctor_id: doctor_id.to_string(),
        name: "Asha Rao".into(),
        age: 34,
        gender: Gender::Female,
        email: "asha@example.com".into(),
        mobile: "9876543210".into(),
        address: "12 Lakeview Road".into(),
        date: chrono::Local::now().date_naive() + chrono::Duration::days(10),
        time: "10:30".into(),
        reason: "Recurring chest pain".into(),
        previous_treatment: None,
        remarks: None,
        certificate: None,
    }
}
