use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::{
    clock::Clock,
    consultation::{
        ConsultationId, ConsultationRequest, ConsultationStatus, NewConsultation, Priority,
    },
    message::{ChatMessage, MessageId, MessageKind, NewMessage},
    profile::UserId,
};

/// Outcome of a status transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },
    NotFound,
    Rejected {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("consultation {0} does not exist")]
    UnknownConsultation(ConsultationId),
}

/// Session-local collections of consultations and chat messages.
///
/// Consultations are kept most-recent-first, messages in insertion order.
#[derive(Debug)]
pub struct DomainStore<C> {
    clock: C,
    consultations: Vec<ConsultationRequest>,
    messages: Vec<ChatMessage>,
}

impl<C: Clock> DomainStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            consultations: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Store pre-filled with two consultations and a short conversation owned by `client_id`.
    pub fn with_demo_data(clock: C, client_id: &UserId) -> Self {
        let mut store = Self::new(clock);
        store.consultations = demo_consultations(client_id);
        store.messages = demo_messages(client_id);
        store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn consultations(&self) -> &[ConsultationRequest] {
        &self.consultations
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn consultation(&self, id: &ConsultationId) -> Option<&ConsultationRequest> {
        self.consultations.iter().find(|item| &item.id == id)
    }

    pub fn create_consultation(&mut self, data: NewConsultation) -> ConsultationRequest {
        let now = self.clock.now();
        let consultation = ConsultationRequest {
            id: ConsultationId(Uuid::new_v4().to_string()),
            client_id: data.client_id,
            title: data.title,
            description: data.description,
            status: ConsultationStatus::Analyzing,
            priority: data.priority,
            deadline: data.deadline,
            created_at: now,
            updated_at: now,
            assigned_analyst: data.assigned_analyst,
            files: data.files,
            proposal: data.proposal,
            is_free: data.is_free,
        };

        tracing::debug!(
            consultation_id = %consultation.id,
            client_id = %consultation.client_id,
            "consultation created"
        );

        self.consultations.insert(0, consultation.clone());
        consultation
    }

    pub fn update_consultation_status(
        &mut self,
        id: &ConsultationId,
        to: ConsultationStatus,
    ) -> StatusUpdate {
        let now = self.clock.now();
        let Some(consultation) = self.consultations.iter_mut().find(|item| &item.id == id) else {
            return StatusUpdate::NotFound;
        };

        let from = consultation.status;
        if !from.can_transition_to(to) {
            return StatusUpdate::Rejected { from, to };
        }

        consultation.status = to;
        consultation.updated_at = strictly_after(consultation.updated_at, now);

        StatusUpdate::Applied { from, to }
    }

    pub fn add_message(&mut self, data: NewMessage) -> Result<ChatMessage, StoreError> {
        if self.consultation(&data.consultation_id).is_none() {
            return Err(StoreError::UnknownConsultation(data.consultation_id));
        }

        let message = ChatMessage {
            id: MessageId(Uuid::new_v4().to_string()),
            consultation_id: data.consultation_id,
            sender_id: data.sender_id,
            sender_name: data.sender_name,
            content: data.content,
            timestamp: self.clock.now(),
            kind: data.kind,
        };

        self.messages.push(message.clone());
        Ok(message)
    }

    pub fn consultation_messages(&self, consultation_id: &ConsultationId) -> Vec<&ChatMessage> {
        self.messages
            .iter()
            .filter(|message| &message.consultation_id == consultation_id)
            .collect()
    }

    pub fn last_message(&self, consultation_id: &ConsultationId) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| &message.consultation_id == consultation_id)
    }
}

fn strictly_after(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

fn fixture_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn demo_consultations(client_id: &UserId) -> Vec<ConsultationRequest> {
    let deadline = |month, day| {
        chrono::NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
    };

    vec![
        ConsultationRequest {
            id: ConsultationId::new("1"),
            client_id: client_id.clone(),
            title: "Customer Churn Analysis".to_owned(),
            description:
                "Need help analyzing customer retention patterns and identifying at-risk customers."
                    .to_owned(),
            status: ConsultationStatus::Analyzing,
            priority: Priority::High,
            deadline: deadline(2, 15),
            created_at: fixture_time(2025, 1, 15, 10, 0),
            updated_at: fixture_time(2025, 1, 15, 10, 0),
            assigned_analyst: Some("analyst-1".to_owned()),
            files: Vec::new(),
            proposal: None,
            is_free: false,
        },
        ConsultationRequest {
            id: ConsultationId::new("2"),
            client_id: client_id.clone(),
            title: "Sales Performance Dashboard".to_owned(),
            description:
                "Create a comprehensive dashboard to track sales KPIs and team performance."
                    .to_owned(),
            status: ConsultationStatus::Proposal,
            priority: Priority::Medium,
            deadline: deadline(2, 20),
            created_at: fixture_time(2025, 1, 10, 14, 0),
            updated_at: fixture_time(2025, 1, 18, 9, 0),
            assigned_analyst: Some("analyst-2".to_owned()),
            files: Vec::new(),
            proposal: None,
            is_free: false,
        },
    ]
}

fn demo_messages(client_id: &UserId) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            id: MessageId("1".to_owned()),
            consultation_id: ConsultationId::new("1"),
            sender_id: UserId::new("analyst-1"),
            sender_name: "María González".to_owned(),
            content: "Hi! I received your churn analysis request. Could you share more detail on the time period you want analysed?".to_owned(),
            timestamp: fixture_time(2025, 1, 15, 11, 0),
            kind: MessageKind::Text,
        },
        ChatMessage {
            id: MessageId("2".to_owned()),
            consultation_id: ConsultationId::new("1"),
            sender_id: client_id.clone(),
            sender_name: "Demo User".to_owned(),
            content: "Please analyse the last 12 months. I have the data as CSV.".to_owned(),
            timestamp: fixture_time(2025, 1, 15, 11, 30),
            kind: MessageKind::Text,
        },
    ]
}
