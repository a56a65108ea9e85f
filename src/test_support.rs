use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::domain::{
    consultation::{NewConsultation, Priority},
    profile::{Role, UserId, UserProfile},
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub fn client_profile(id: &str) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        email: format!("{id}@example.com"),
        name: "Demo User".to_owned(),
        company: Some("Acme".to_owned()),
        role: Role::Client,
        avatar_url: None,
        company_logo_url: None,
        maturity_level: None,
        maturity_assessment: None,
        free_consultations_used: 0,
        created_at: None,
        updated_at: None,
    }
}

pub fn admin_profile(id: &str) -> UserProfile {
    UserProfile {
        role: Role::Admin,
        name: "Admin".to_owned(),
        ..client_profile(id)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("fixture date should be valid")
}

pub fn new_consultation(client_id: &str, title: &str, deadline: NaiveDate) -> NewConsultation {
    NewConsultation {
        client_id: UserId::new(client_id),
        title: title.to_owned(),
        description: format!("{title} description"),
        priority: Priority::Medium,
        deadline,
        assigned_analyst: None,
        files: Vec::new(),
        proposal: None,
        is_free: false,
    }
}
