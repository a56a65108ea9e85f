use thiserror::Error;

use crate::domain::{
    calendar::MonthView,
    consultation::{ConsultationId, ConsultationStatus},
};

pub const HELP_LINES: [&str; 15] = [
    "board                     consultations grouped by status",
    "new                       submit a consultation request",
    "move <id> <status>        change status (admins: analyzing, proposal, delivered, cancelled)",
    "chats [search]            conversations, optionally filtered",
    "chat <id>                 messages of one consultation",
    "send <id> <text>          post a message",
    "calendar [YYYY-MM|next|prev]",
    "assess                    digital maturity questionnaire",
    "recommend                 services for your maturity level",
    "profile                   your profile",
    "company <name>            update company name",
    "wait                      check for new replies",
    "logout                    sign out",
    "quit                      exit",
    "help                      this list",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarNav {
    Current,
    Next,
    Previous,
    Month(MonthView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Board,
    New,
    Move {
        id: ConsultationId,
        to: ConsultationStatus,
    },
    Chats {
        search: String,
    },
    Chat {
        id: ConsultationId,
    },
    Send {
        id: ConsultationId,
        text: String,
    },
    Calendar(CalendarNav),
    Assess,
    Recommend,
    Profile,
    Company {
        name: String,
    },
    Wait,
    Logout,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown status `{0}`")]
    UnknownStatus(String),
    #[error("expected YYYY-MM, `next` or `prev`, got `{0}`")]
    BadMonth(String),
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => ConsoleCommand::Help,
        "board" => ConsoleCommand::Board,
        "new" => ConsoleCommand::New,
        "move" => {
            let (id, status) = split_word(rest)
                .filter(|(_, status)| !status.is_empty())
                .ok_or(CommandError::Usage("move <id> <status>"))?;
            let to = ConsultationStatus::parse(status)
                .ok_or_else(|| CommandError::UnknownStatus(status.to_owned()))?;
            ConsoleCommand::Move {
                id: ConsultationId::new(id),
                to,
            }
        }
        "chats" => ConsoleCommand::Chats {
            search: rest.to_owned(),
        },
        "chat" => {
            let (id, _) = split_word(rest).ok_or(CommandError::Usage("chat <id>"))?;
            ConsoleCommand::Chat {
                id: ConsultationId::new(id),
            }
        }
        "send" => {
            let (id, text) = split_word(rest)
                .filter(|(_, text)| !text.is_empty())
                .ok_or(CommandError::Usage("send <id> <text>"))?;
            ConsoleCommand::Send {
                id: ConsultationId::new(id),
                text: text.to_owned(),
            }
        }
        "calendar" | "cal" => ConsoleCommand::Calendar(parse_calendar_nav(rest)?),
        "assess" | "onboarding" => ConsoleCommand::Assess,
        "recommend" => ConsoleCommand::Recommend,
        "profile" => ConsoleCommand::Profile,
        "company" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("company <name>"));
            }
            ConsoleCommand::Company {
                name: rest.to_owned(),
            }
        }
        "wait" | "refresh" => ConsoleCommand::Wait,
        "logout" => ConsoleCommand::Logout,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        _ => return Err(CommandError::Unknown(verb.to_owned())),
    };

    Ok(Some(command))
}

fn parse_calendar_nav(arg: &str) -> Result<CalendarNav, CommandError> {
    match arg.to_ascii_lowercase().as_str() {
        "" => Ok(CalendarNav::Current),
        "next" => Ok(CalendarNav::Next),
        "prev" | "previous" => Ok(CalendarNav::Previous),
        _ => MonthView::parse(arg)
            .map(CalendarNav::Month)
            .ok_or_else(|| CommandError::BadMonth(arg.to_owned())),
    }
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((input, "")),
    }
}
