use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    domain::{
        clock::Clock,
        consultation::{ConsultationId, ConsultationRequest},
        message::{ChatMessage, MessageKind, NewMessage},
        profile::{UserId, UserProfile},
        store::{DomainStore, StoreError},
    },
    infra::config::ChatConfig,
};

// Configured delays above one day are clamped.
const MAX_AUTO_REPLY_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("message is empty")]
    Empty,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Posts `text` as `sender` and queues the analyst's canned reply.
pub fn send_message<C: Clock>(
    store: &mut DomainStore<C>,
    replies: &mut AutoReplyQueue,
    sender: &UserProfile,
    consultation_id: &ConsultationId,
    text: &str,
) -> Result<ChatMessage, SendError> {
    let content = text.trim();
    if content.is_empty() {
        return Err(SendError::Empty);
    }

    // Foreign consultations look the same as missing ones.
    let visible = store
        .consultation(consultation_id)
        .is_some_and(|consultation| sender.can_view(&consultation.client_id));
    if !visible {
        return Err(StoreError::UnknownConsultation(consultation_id.clone()).into());
    }

    let message = store.add_message(NewMessage {
        consultation_id: consultation_id.clone(),
        sender_id: sender.id.clone(),
        sender_name: sender.name.clone(),
        content: content.to_owned(),
        kind: MessageKind::Text,
    })?;

    replies.schedule(consultation_id.clone(), message.timestamp);
    Ok(message)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReply {
    consultation_id: ConsultationId,
    due_at: DateTime<Utc>,
}

/// Deferred analyst replies. Every sent message gets its own reply; nothing is
/// cancelled or merged.
#[derive(Debug, Clone)]
pub struct AutoReplyQueue {
    delay: Duration,
    analyst_id: UserId,
    analyst_name: String,
    text: String,
    pending: Vec<PendingReply>,
}

impl AutoReplyQueue {
    pub fn new(config: &ChatConfig) -> Self {
        let delay_ms = config.auto_reply_delay_ms.min(MAX_AUTO_REPLY_DELAY_MS) as i64;
        Self {
            delay: Duration::milliseconds(delay_ms),
            analyst_id: UserId::new(config.analyst_id.clone()),
            analyst_name: config.analyst_name.clone(),
            text: config.auto_reply_text.clone(),
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, consultation_id: ConsultationId, sent_at: DateTime<Utc>) {
        self.pending.push(PendingReply {
            consultation_id,
            due_at: sent_at + self.delay,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time among pending replies.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.iter().map(|reply| reply.due_at).min()
    }

    /// Appends every reply due at or before the store clock's `now`, oldest first.
    pub fn drain_due<C: Clock>(&mut self, store: &mut DomainStore<C>) -> Vec<ChatMessage> {
        let now = store.clock().now();
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|reply| reply.due_at <= now);
        self.pending = waiting;

        due.into_iter()
            .filter_map(|reply| {
                store
                    .add_message(NewMessage {
                        consultation_id: reply.consultation_id,
                        sender_id: self.analyst_id.clone(),
                        sender_name: self.analyst_name.clone(),
                        content: self.text.clone(),
                        kind: MessageKind::Text,
                    })
                    .inspect_err(|error| tracing::warn!(%error, "auto reply dropped"))
                    .ok()
            })
            .collect()
    }
}

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation<'a> {
    pub consultation: &'a ConsultationRequest,
    pub last_message: Option<&'a ChatMessage>,
}

/// Consultations `viewer` may chat about, filtered by a case-insensitive
/// substring of title or description. An empty search keeps everything.
pub fn conversation_list<'a, C: Clock>(
    store: &'a DomainStore<C>,
    viewer: &UserProfile,
    search: &str,
) -> Vec<Conversation<'a>> {
    let needle = search.trim().to_lowercase();

    store
        .consultations()
        .iter()
        .filter(|consultation| viewer.can_view(&consultation.client_id))
        .filter(|consultation| {
            needle.is_empty()
                || consultation.title.to_lowercase().contains(&needle)
                || consultation.description.to_lowercase().contains(&needle)
        })
        .map(|consultation| Conversation {
            consultation,
            last_message: store.last_message(&consultation.id),
        })
        .collect()
}
