//! Plain-text rendering for the console.
//!
//! Every function returns lines; printing is left to the caller so the
//! output can be asserted on directly.

use chrono::{NaiveDate, TimeZone};

use crate::{
    domain::{
        board::{Board, BoardCard},
        calendar::{MonthView, DAY_NAMES, MAX_TITLES_PER_DAY},
        consultation::{ConsultationRequest, ConsultationStatus},
        maturity::{recommendations, MaturityTier},
        message::ChatMessage,
        profile::UserProfile,
    },
    usecases::chat::Conversation,
};

const CELL_WIDTH: usize = 5;

pub fn board_lines(board: &Board) -> Vec<String> {
    let mut lines = Vec::new();
    if board.total_cards() == 0 {
        lines.push("No consultations yet.".to_owned());
    }

    for column in &board.columns {
        lines.push(format!(
            "== {} ({}) ==",
            column.status.title(),
            column.cards.len()
        ));
        if column.cards.is_empty() {
            lines.push("   (empty)".to_owned());
        }
        for card in &column.cards {
            lines.extend(card_lines(card));
        }
    }

    lines
}

fn card_lines(card: &BoardCard) -> Vec<String> {
    let mut header = format!(
        "   [{}] {} | {} priority | due {}",
        card.id,
        card.title,
        card.priority.as_str(),
        card.deadline.format("%Y-%m-%d")
    );
    if card.due_soon {
        header.push_str(" | DUE SOON");
    }
    if card.assigned {
        header.push_str(" | analyst assigned");
    }

    let mut lines = vec![header, format!("       {}", card.description)];
    if !card.moves.is_empty() {
        let targets: Vec<_> = card.moves.iter().map(|status| status.as_str()).collect();
        lines.push(format!("       move to: {}", targets.join(", ")));
    }
    lines
}

/// Sunday-first month grid. Days with deadlines carry a `*`, today is bracketed.
/// The grid is followed by one line per day with deadlines.
pub fn calendar_lines(
    month: &MonthView,
    consultations: &[ConsultationRequest],
    viewer: &UserProfile,
    today: NaiveDate,
) -> Vec<String> {
    let mut lines = vec![
        month.title(),
        DAY_NAMES
            .iter()
            .map(|name| format!("{name:>width$}", width = CELL_WIDTH))
            .collect(),
    ];

    let mut week = " ".repeat(CELL_WIDTH * month.first_weekday_offset() as usize);
    let mut agenda = Vec::new();

    for day in 1..=month.days_in_month() {
        let entries = month.entries_for(day, consultations, viewer);
        let is_today = month.date(day) == Some(today);
        let marker = if entries.is_empty() { ' ' } else { '*' };
        let cell = if is_today {
            format!("[{day:>2}]{marker}")
        } else {
            format!(" {day:>2} {marker}")
        };
        week.push_str(&cell);

        if week.len() >= CELL_WIDTH * DAY_NAMES.len() {
            lines.push(week.trim_end().to_owned());
            week = String::new();
        }

        if !entries.is_empty() {
            agenda.push(format!("  {day:>2}: {}", day_summary(&entries)));
        }
    }
    if !week.trim().is_empty() {
        lines.push(week.trim_end().to_owned());
    }

    if agenda.is_empty() {
        lines.push("No deadlines this month.".to_owned());
    } else {
        lines.push("Deadlines:".to_owned());
        lines.extend(agenda);
    }

    lines
}

fn day_summary(entries: &[&ConsultationRequest]) -> String {
    let titles: Vec<_> = entries
        .iter()
        .take(MAX_TITLES_PER_DAY)
        .map(|entry| format!("{} ({})", entry.title, entry.status.as_str()))
        .collect();
    let mut summary = titles.join(", ");
    if entries.len() > MAX_TITLES_PER_DAY {
        summary.push_str(&format!(" +{} more", entries.len() - MAX_TITLES_PER_DAY));
    }
    summary
}

pub fn conversation_lines(conversations: &[Conversation<'_>]) -> Vec<String> {
    if conversations.is_empty() {
        return vec!["No conversations found.".to_owned()];
    }

    conversations
        .iter()
        .map(|conversation| {
            let consultation = conversation.consultation;
            let preview = conversation
                .last_message
                .map(|message| format!("{}: {}", message.sender_name, message.display_content()))
                .unwrap_or_else(|| "no messages yet".to_owned());
            format!(
                "[{}] {} ({}) | {}",
                consultation.id,
                consultation.title,
                consultation.status.as_str(),
                preview
            )
        })
        .collect()
}

/// Visual element of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    DateSeparator(String),
    Message {
        time: String,
        sender: Option<String>,
        content: String,
    },
}

/// Groups consecutive messages from one sender and inserts a separator when
/// the day changes in `tz`.
pub fn build_message_list_elements<Tz: TimeZone>(
    messages: &[&ChatMessage],
    viewer: &UserProfile,
    tz: &Tz,
) -> Vec<MessageListElement>
where
    Tz::Offset: std::fmt::Display,
{
    let mut elements = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for message in messages {
        let local = message.timestamp.with_timezone(tz);
        let date = local.date_naive();

        if prev_date != Some(date) {
            elements.push(MessageListElement::DateSeparator(
                date.format("%-d %b %Y").to_string(),
            ));
            prev_sender = None;
        }

        let sender_name = if message.is_from(&viewer.id) {
            "You"
        } else {
            message.sender_name.as_str()
        };

        elements.push(MessageListElement::Message {
            time: local.format("%H:%M").to_string(),
            sender: (prev_sender != Some(sender_name)).then(|| sender_name.to_owned()),
            content: message.display_content(),
        });

        prev_date = Some(date);
        prev_sender = Some(sender_name);
    }

    elements
}

pub fn chat_lines<Tz: TimeZone>(
    consultation: &ConsultationRequest,
    messages: &[&ChatMessage],
    viewer: &UserProfile,
    tz: &Tz,
) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut lines = vec![format!(
        "{} [{}] ({})",
        consultation.title,
        consultation.id,
        consultation.status.title()
    )];
    if messages.is_empty() {
        lines.push("No messages yet. Use `send <id> <text>`.".to_owned());
        return lines;
    }

    for element in build_message_list_elements(messages, viewer, tz) {
        match element {
            MessageListElement::DateSeparator(date) => lines.push(format!("--- {date} ---")),
            MessageListElement::Message {
                time,
                sender: Some(sender),
                content,
            } => {
                lines.push(format!("{time:>5} {sender}:"));
                lines.extend(content.lines().map(|line| format!("      {line}")));
            }
            MessageListElement::Message {
                time,
                sender: None,
                content,
            } => {
                let mut content_lines = content.lines();
                lines.push(format!(
                    "{time:>5} {}",
                    content_lines.next().unwrap_or_default()
                ));
                lines.extend(content_lines.map(|line| format!("      {line}")));
            }
        }
    }

    lines
}

pub fn recommendation_lines(score: f64) -> Vec<String> {
    let tier = MaturityTier::from_score(score);
    let mut lines = vec![
        format!("Maturity level: {} ({score:.1}/5)", tier.label()),
        tier.description().to_owned(),
    ];

    for recommendation in recommendations(score) {
        let badge = if recommendation.recommended {
            " [recommended]"
        } else {
            ""
        };
        lines.push(String::new());
        lines.push(format!(
            "{}{badge} | {}",
            recommendation.title, recommendation.price
        ));
        lines.push(format!("  {}", recommendation.description));
        lines.extend(
            recommendation
                .features
                .iter()
                .map(|feature| format!("  - {feature}")),
        );
    }

    lines
}

pub fn profile_lines(profile: &UserProfile) -> Vec<String> {
    let mut lines = vec![
        format!("Name:    {}", profile.name),
        format!("Email:   {}", profile.email),
        format!("Role:    {}", profile.role.as_str()),
        format!(
            "Company: {}",
            profile.company.as_deref().unwrap_or("(not set)")
        ),
    ];

    match profile.maturity_level {
        Some(level) => lines.push(format!(
            "Maturity: {level:.1}/5 ({})",
            MaturityTier::from_score(level).label()
        )),
        None => lines.push("Maturity: not assessed, run `assess`".to_owned()),
    }

    if profile.role.can_manage_workflow() {
        lines.push(format!(
            "Workflow: you can move consultations between {}",
            ConsultationStatus::ALL.map(ConsultationStatus::as_str).join(", ")
        ));
    } else {
        lines.push(format!(
            "Free consultations left: {}",
            profile.free_consultations_left()
        ));
    }

    lines
}
