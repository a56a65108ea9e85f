use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::profile::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsultationId(pub String);

impl ConsultationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

}

impl fmt::Display for ConsultationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow position of a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Analyzing,
    Proposal,
    Delivered,
    Cancelled,
}

/// Allowed `(from, to)` pairs. Anything not listed is rejected by the store.
const ALLOWED_TRANSITIONS: [(ConsultationStatus, ConsultationStatus); 7] = [
    (ConsultationStatus::Analyzing, ConsultationStatus::Proposal),
    (ConsultationStatus::Analyzing, ConsultationStatus::Delivered),
    (ConsultationStatus::Analyzing, ConsultationStatus::Cancelled),
    (ConsultationStatus::Proposal, ConsultationStatus::Analyzing),
    (ConsultationStatus::Proposal, ConsultationStatus::Delivered),
    (ConsultationStatus::Proposal, ConsultationStatus::Cancelled),
    (ConsultationStatus::Delivered, ConsultationStatus::Proposal),
];

impl ConsultationStatus {
    /// Board column order.
    pub const ALL: [ConsultationStatus; 4] = [
        ConsultationStatus::Analyzing,
        ConsultationStatus::Proposal,
        ConsultationStatus::Delivered,
        ConsultationStatus::Cancelled,
    ];

    pub fn can_transition_to(self, to: ConsultationStatus) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, to))
    }

    pub fn allowed_targets(self) -> Vec<ConsultationStatus> {
        Self::ALL
            .into_iter()
            .filter(|to| self.can_transition_to(*to))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Proposal => "proposal",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Analyzing => "In analysis",
            Self::Proposal => "Proposal",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Local, ephemeral reference to a file the client attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub value: f64,
    pub trend: KpiTrend,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub consultation_id: ConsultationId,
    pub executive_summary: String,
    pub recommendations: Vec<String>,
    pub kpis: Vec<Kpi>,
    pub created_at: DateTime<Utc>,
    pub status: ProposalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub id: ConsultationId,
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub status: ConsultationStatus,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_analyst: Option<String>,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    #[serde(default, rename = "is_free")]
    pub is_free: bool,
}

impl ConsultationRequest {
    /// Days from `today` until the deadline; negative once it has passed.
    pub fn days_until_deadline(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Deadline falls within the next three days, today included.
    pub fn is_due_soon(&self, today: NaiveDate) -> bool {
        (0..=3).contains(&self.days_until_deadline(today))
    }
}

/// Everything the caller supplies when creating a consultation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConsultation {
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub assigned_analyst: Option<String>,
    pub files: Vec<FileAttachment>,
    pub proposal: Option<Proposal>,
    pub is_free: bool,
}
