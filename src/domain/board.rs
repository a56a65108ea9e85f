use chrono::NaiveDate;

use super::{
    consultation::{ConsultationId, ConsultationRequest, ConsultationStatus, Priority},
    profile::UserProfile,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    pub id: ConsultationId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub due_soon: bool,
    pub assigned: bool,
    /// Statuses the viewer may move this card to. Empty for non-admins.
    pub moves: Vec<ConsultationStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: ConsultationStatus,
    pub cards: Vec<BoardCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn build(
        consultations: &[ConsultationRequest],
        viewer: &UserProfile,
        today: NaiveDate,
    ) -> Self {
        let columns = ConsultationStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                cards: consultations
                    .iter()
                    .filter(|item| item.status == status && viewer.can_view(&item.client_id))
                    .map(|item| card(item, viewer, today))
                    .collect(),
            })
            .collect();

        Self { columns }
    }

    pub fn total_cards(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }
}

fn card(item: &ConsultationRequest, viewer: &UserProfile, today: NaiveDate) -> BoardCard {
    let moves = if viewer.role.can_manage_workflow() {
        item.status.allowed_targets()
    } else {
        Vec::new()
    };

    BoardCard {
        id: item.id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        priority: item.priority,
        deadline: item.deadline,
        due_soon: item.is_due_soon(today),
        assigned: item.assigned_analyst.is_some(),
        moves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            clock::{Clock, ManualClock},
            store::DomainStore,
        },
        test_support::{admin_profile, client_profile, date, new_consultation},
    };

    fn seeded_store(clock: &ManualClock) -> DomainStore<&ManualClock> {
        let mut store = DomainStore::new(clock);
        store.create_consultation(new_consultation("u-1", "Mine", date(2025, 1, 22)));
        store.create_consultation(new_consultation("u-2", "Theirs", date(2025, 3, 1)));
        store
    }

    #[test]
    fn client_sees_only_own_cards_without_moves() {
        let clock = ManualClock::at(2025, 1, 20);
        let store = seeded_store(&clock);

        let board = Board::build(store.consultations(), &client_profile("u-1"), clock.today());

        assert_eq!(board.total_cards(), 1);
        let analyzing = &board.columns[0];
        assert_eq!(analyzing.status, ConsultationStatus::Analyzing);
        assert_eq!(analyzing.cards[0].title, "Mine");
        assert!(analyzing.cards[0].moves.is_empty());
        assert!(analyzing.cards[0].due_soon);
    }

    #[test]
    fn admin_sees_all_cards_with_allowed_moves() {
        let clock = ManualClock::at(2025, 1, 20);
        let store = seeded_store(&clock);

        let board = Board::build(store.consultations(), &admin_profile("a-1"), clock.today());

        assert_eq!(board.total_cards(), 2);
        let card = &board.columns[0].cards[0];
        assert_eq!(card.moves, ConsultationStatus::Analyzing.allowed_targets());
    }

    #[test]
    fn columns_follow_workflow_order_even_when_empty() {
        let clock = ManualClock::at(2025, 1, 20);
        let store = DomainStore::new(&clock);

        let board = Board::build(store.consultations(), &client_profile("u-1"), clock.today());

        let statuses: Vec<_> = board.columns.iter().map(|c| c.status).collect();
        assert_eq!(statuses, ConsultationStatus::ALL.to_vec());
        assert_eq!(board.total_cards(), 0);
    }
}
