use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::maturity::MaturityAssessment;

/// Number of consultations a client may mark as free. Not enforced by the store.
pub const FREE_CONSULTATION_LIMIT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Admin,
    Analyst,
}

impl Role {
    /// Only admins may move consultations through the workflow.
    pub fn can_manage_workflow(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Only clients open consultation requests.
    pub fn can_request_consultations(self) -> bool {
        matches!(self, Role::Client)
    }

    /// Admins see every consultation; everyone else sees their own.
    pub fn sees_all_consultations(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
            Role::Analyst => "analyst",
        }
    }
}

/// Profile row as stored by the backend `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_assessment: Option<MaturityAssessment>,
    #[serde(default)]
    pub free_consultations_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn free_consultations_left(&self) -> u32 {
        FREE_CONSULTATION_LIMIT.saturating_sub(self.free_consultations_used)
    }

    pub fn has_free_consultation(&self) -> bool {
        self.free_consultations_left() > 0
    }

    pub fn can_view(&self, owner: &UserId) -> bool {
        self.role.sees_all_consultations() || &self.id == owner
    }

    /// Copy of this profile with every `Some` field of `update` applied.
    #[cfg(test)]
    pub fn merged(&self, update: &ProfileUpdate) -> Self {
        let mut profile = self.clone();
        if let Some(name) = &update.name {
            profile.name = name.clone();
        }
        if let Some(company) = &update.company {
            profile.company = Some(company.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(logo_url) = &update.company_logo_url {
            profile.company_logo_url = Some(logo_url.clone());
        }
        if let Some(level) = update.maturity_level {
            profile.maturity_level = Some(level);
        }
        if let Some(assessment) = &update.maturity_assessment {
            profile.maturity_assessment = Some(assessment.clone());
        }
        if let Some(used) = update.free_consultations_used {
            profile.free_consultations_used = used;
        }
        if update.updated_at.is_some() {
            profile.updated_at = update.updated_at;
        }
        profile
    }
}

/// Partial profile update; `None` fields are left untouched and not sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_assessment: Option<MaturityAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_consultations_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileUpdate {
    pub fn company(company: impl Into<String>) -> Self {
        Self {
            company: Some(company.into()),
            ..Self::default()
        }
    }

    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }
}
