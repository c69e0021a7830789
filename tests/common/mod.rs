//! Fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use clinic::adapters::database::ClinicStore;
use clinic::adapters::memory::MemoryStore;
use clinic::adapters::notify::{Notification, NotificationOutcome, Notifier};
use clinic::core::accounts::hash_password_with_iterations;
use clinic::domain::{
    CallerIdentity, Doctor, NewDoctor, NewPatient, NewTimeSlot, NewUser, Patient, TimeSlot, User,
};
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "correct-horse";

/// Low PBKDF2 work factor so fixtures hash quickly
pub const FIXTURE_ITERATIONS: u32 = 1_000;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn dyn_store(store: &Arc<MemoryStore>) -> Arc<dyn ClinicStore + Send + Sync> {
    store.clone()
}

pub async fn doctor(store: &MemoryStore, name: &str) -> Doctor {
    let specialty = store.insert_specialty(&format!("{name} Specialty")).await.unwrap();
    store
        .insert_doctor(NewDoctor::named(name).with_specialty(specialty.id))
        .await
        .unwrap()
}

pub async fn slot(
    store: &MemoryStore,
    doctor: &Doctor,
    date: NaiveDate,
    start: NaiveTime,
    capacity: u16,
) -> TimeSlot {
    let end = start + chrono::Duration::minutes(30);
    store
        .insert_timeslot(
            NewTimeSlot::builder()
                .doctor(doctor.id)
                .date(date)
                .window(start, end)
                .capacity(capacity)
                .build()
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn user(store: &MemoryStore, username: &str, is_staff: bool) -> User {
    store
        .insert_user(NewUser {
            username: username.to_string(),
            password_hash: hash_password_with_iterations(PASSWORD, FIXTURE_ITERATIONS),
            is_staff,
        })
        .await
        .unwrap()
}

/// A login with a linked patient profile
pub async fn patient(store: &MemoryStore, username: &str, email: &str) -> (CallerIdentity, Patient) {
    let user = user(store, username, false).await;
    let patient = store
        .insert_patient(
            NewPatient::named(format!("{username} Patient"))
                .for_user(user.id)
                .with_email(email),
        )
        .await
        .unwrap();
    (CallerIdentity::from(&user), patient)
}

/// Keeps every delivered notification
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> NotificationOutcome {
        self.sent.lock().unwrap().push(notification.clone());
        NotificationOutcome::Sent
    }
}

/// A delivery backend that is always down
pub struct FailingNotifier {
    pub reason: String,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _notification: &Notification) -> NotificationOutcome {
        NotificationOutcome::Failed(self.reason.clone())
    }
}
