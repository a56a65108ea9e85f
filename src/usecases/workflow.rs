use crate::domain::{
    clock::Clock,
    consultation::{ConsultationId, ConsultationStatus},
    profile::UserProfile,
    store::{DomainStore, StatusUpdate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Applied {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },
    NotFound,
    Rejected {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },
    Forbidden,
}

/// Moves a consultation on behalf of `viewer`. Only admins manage the workflow.
pub fn change_status<C: Clock>(
    store: &mut DomainStore<C>,
    viewer: &UserProfile,
    id: &ConsultationId,
    to: ConsultationStatus,
) -> StatusChange {
    if !viewer.role.can_manage_workflow() {
        tracing::debug!(user_id = %viewer.id, consultation_id = %id, "status change forbidden");
        return StatusChange::Forbidden;
    }

    match store.update_consultation_status(id, to) {
        StatusUpdate::Applied { from, to } => {
            tracing::info!(
                consultation_id = %id,
                from = from.as_str(),
                to = to.as_str(),
                "consultation status changed"
            );
            StatusChange::Applied { from, to }
        }
        StatusUpdate::NotFound => StatusChange::NotFound,
        StatusUpdate::Rejected { from, to } => StatusChange::Rejected { from, to },
    }
}
