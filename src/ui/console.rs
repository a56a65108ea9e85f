//! Command loop run after sign-in.

use std::{path::PathBuf, thread, time::Duration as StdDuration};

use anyhow::Result;
use chrono::Local;

use crate::{
    domain::{
        board::Board,
        calendar::MonthView,
        clock::Clock,
        consultation::{ConsultationId, ConsultationStatus, Priority},
        maturity::{Question, QUESTIONNAIRE},
        profile::{ProfileUpdate, UserProfile},
        store::DomainStore,
    },
    usecases::{
        chat::{conversation_list, send_message, AutoReplyQueue},
        consultations::ConsultationDraft,
        onboarding::{CompanyInfo, OnboardingResult, OnboardingWizard, Step, TOTAL_STEPS},
        session::{SessionError, SessionStore},
        workflow::{change_status, StatusChange},
    },
};

use super::{
    command::{parse, CalendarNav, ConsoleCommand, HELP_LINES},
    render,
    terminal::Terminal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    LoggedOut,
}

pub struct Console<'a, C: Clock> {
    terminal: &'a mut dyn Terminal,
    store: &'a mut DomainStore<C>,
    session: &'a mut SessionStore<C>,
    replies: &'a mut AutoReplyQueue,
    month: MonthView,
    persist_assessment: bool,
    // Latest assessment of this sign-in, kept even when it is not persisted.
    last_assessment: Option<OnboardingResult>,
}

impl<'a, C: Clock> Console<'a, C> {
    pub fn new(
        terminal: &'a mut dyn Terminal,
        store: &'a mut DomainStore<C>,
        session: &'a mut SessionStore<C>,
        replies: &'a mut AutoReplyQueue,
        persist_assessment: bool,
    ) -> Self {
        let month = MonthView::containing(store.clock().today());
        Self {
            terminal,
            store,
            session,
            replies,
            month,
            persist_assessment,
            last_assessment: None,
        }
    }

    pub fn run(&mut self) -> Result<ConsoleExit> {
        self.terminal.print_line("Type `help` for commands.")?;
        if self
            .session
            .current()
            .is_some_and(|profile| profile.maturity_level.is_none())
        {
            self.terminal
                .print_line("Tip: run `assess` to get service recommendations.")?;
        }

        loop {
            self.deliver_replies()?;

            let Some(line) = self.terminal.prompt_line("> ")? else {
                return Ok(ConsoleExit::Quit);
            };

            let command = match parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(error) => {
                    self.terminal.print_line(&error.to_string())?;
                    continue;
                }
            };

            if let Some(exit) = self.dispatch(command)? {
                return Ok(exit);
            }
        }
    }

    fn dispatch(&mut self, command: ConsoleCommand) -> Result<Option<ConsoleExit>> {
        let viewer = match self.session.require_current() {
            Ok(profile) => profile.clone(),
            Err(error) => {
                self.terminal.print_line(&error.to_string())?;
                return Ok(Some(ConsoleExit::LoggedOut));
            }
        };

        match command {
            ConsoleCommand::Help => {
                for line in HELP_LINES {
                    self.terminal.print_line(line)?;
                }
            }
            ConsoleCommand::Board => {
                let board =
                    Board::build(self.store.consultations(), &viewer, self.store.clock().today());
                self.terminal.print_lines(&render::board_lines(&board))?;
            }
            ConsoleCommand::New => self.new_consultation(&viewer)?,
            ConsoleCommand::Move { id, to } => self.move_consultation(&viewer, &id, to)?,
            ConsoleCommand::Chats { search } => {
                let conversations = conversation_list(self.store, &viewer, &search);
                let lines = render::conversation_lines(&conversations);
                self.terminal.print_lines(&lines)?;
            }
            ConsoleCommand::Chat { id } => self.show_chat(&viewer, &id)?,
            ConsoleCommand::Send { id, text } => {
                match send_message(self.store, self.replies, &viewer, &id, &text) {
                    Ok(_) => self.terminal.print_line("Sent.")?,
                    Err(error) => self.terminal.print_line(&format!("Not sent: {error}"))?,
                }
            }
            ConsoleCommand::Calendar(nav) => {
                let target = match nav {
                    CalendarNav::Current => Some(MonthView::containing(self.store.clock().today())),
                    CalendarNav::Next => self.month.next(),
                    CalendarNav::Previous => self.month.previous(),
                    CalendarNav::Month(month) => Some(month),
                };
                let Some(month) = target else {
                    self.terminal.print_line("No months beyond this one.")?;
                    return Ok(None);
                };
                self.month = month;
                let lines = render::calendar_lines(
                    &self.month,
                    self.store.consultations(),
                    &viewer,
                    self.store.clock().today(),
                );
                self.terminal.print_lines(&lines)?;
            }
            ConsoleCommand::Assess => self.assess()?,
            ConsoleCommand::Recommend => match self
                .last_assessment
                .as_ref()
                .map(|result| result.score)
                .or(viewer.maturity_level)
            {
                Some(score) => self
                    .terminal
                    .print_lines(&render::recommendation_lines(score))?,
                None => self
                    .terminal
                    .print_line("No assessment yet. Run `assess` first.")?,
            },
            ConsoleCommand::Profile => {
                self.terminal.print_lines(&render::profile_lines(&viewer))?;
            }
            ConsoleCommand::Company { name } => {
                match self.session.update_profile(ProfileUpdate::company(name)) {
                    Ok(Some(profile)) => {
                        let line = format!(
                            "Company set to {}.",
                            profile.company.as_deref().unwrap_or_default()
                        );
                        self.terminal.print_line(&line)?;
                    }
                    Ok(None) => self.terminal.print_line(&SessionError::NoIdentity.to_string())?,
                    Err(error) => self
                        .terminal
                        .print_line(&format!("Profile update failed: {error}"))?,
                }
            }
            ConsoleCommand::Wait => self.wait_for_replies()?,
            ConsoleCommand::Logout => {
                self.session.logout();
                self.terminal.print_line("Signed out.")?;
                return Ok(Some(ConsoleExit::LoggedOut));
            }
            ConsoleCommand::Quit => return Ok(Some(ConsoleExit::Quit)),
        }

        Ok(None)
    }

    fn deliver_replies(&mut self) -> Result<()> {
        for message in self.replies.drain_due(self.store) {
            let title = self
                .store
                .consultation(&message.consultation_id)
                .map(|consultation| consultation.title.clone())
                .unwrap_or_default();
            self.terminal.print_line(&format!(
                "New message in [{}] {title} from {}: {}",
                message.consultation_id,
                message.sender_name,
                message.display_content()
            ))?;
        }
        Ok(())
    }

    fn wait_for_replies(&mut self) -> Result<()> {
        if self.replies.is_empty() {
            self.terminal.print_line("No replies pending.")?;
            return Ok(());
        }
        let Some(due) = self.replies.next_due() else {
            return Ok(());
        };
        self.terminal
            .print_line(&format!("Waiting for {} pending reply(s)...", self.replies.len()))?;

        let remaining = (due - self.store.clock().now()).to_std().unwrap_or_default();
        thread::sleep(remaining.min(StdDuration::from_secs(60)));
        Ok(())
    }

    fn new_consultation(&mut self, viewer: &UserProfile) -> Result<()> {
        if !viewer.role.can_request_consultations() {
            self.terminal
                .print_line("Only clients submit consultation requests.")?;
            return Ok(());
        }

        let Some(draft) = self.prompt_draft(viewer)? else {
            self.terminal.print_line("Cancelled.")?;
            return Ok(());
        };

        match draft.submit(self.store, viewer) {
            Ok(created) => {
                let kind = if created.is_free { "free" } else { "paid" };
                self.terminal.print_line(&format!(
                    "Created [{}] {} ({kind}).",
                    created.id, created.title
                ))?;
            }
            Err(error) => self.terminal.print_line(&format!("Not submitted: {error}"))?,
        }
        Ok(())
    }

    fn prompt_draft(&mut self, viewer: &UserProfile) -> Result<Option<ConsultationDraft>> {
        if viewer.has_free_consultation() {
            self.terminal.print_line(&format!(
                "This request is free ({} free left).",
                viewer.free_consultations_left()
            ))?;
        }

        let Some(title) = self.terminal.prompt_line("Title: ")? else {
            return Ok(None);
        };
        let Some(description) = self.terminal.prompt_line("Description: ")? else {
            return Ok(None);
        };
        let Some(priority) = self
            .terminal
            .prompt_line("Priority [low/medium/high] (medium): ")?
        else {
            return Ok(None);
        };
        let Some(deadline) = self.terminal.prompt_line("Deadline (YYYY-MM-DD): ")? else {
            return Ok(None);
        };
        let Some(files) = self
            .terminal
            .prompt_line("Attach files (comma separated paths, blank for none): ")?
        else {
            return Ok(None);
        };

        Ok(Some(ConsultationDraft {
            title,
            description,
            priority: Priority::parse(&priority).unwrap_or_default(),
            deadline,
            files: files
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .collect(),
        }))
    }

    fn move_consultation(
        &mut self,
        viewer: &UserProfile,
        id: &ConsultationId,
        to: ConsultationStatus,
    ) -> Result<()> {
        let line = match change_status(self.store, viewer, id, to) {
            StatusChange::Applied { from, to } => {
                format!("[{id}] moved from {} to {}.", from.title(), to.title())
            }
            StatusChange::NotFound => format!("No consultation [{id}]."),
            StatusChange::Rejected { from, to } => format!(
                "Cannot move from {} to {}.",
                from.title(),
                to.title()
            ),
            StatusChange::Forbidden => "Only admins can change consultation status.".to_owned(),
        };
        self.terminal.print_line(&line)?;
        Ok(())
    }

    fn show_chat(&mut self, viewer: &UserProfile, id: &ConsultationId) -> Result<()> {
        let Some(consultation) = self
            .store
            .consultation(id)
            .filter(|consultation| viewer.can_view(&consultation.client_id))
        else {
            self.terminal.print_line(&format!("No consultation [{id}]."))?;
            return Ok(());
        };

        let messages = self.store.consultation_messages(id);
        let lines = render::chat_lines(consultation, &messages, viewer, &Local);
        self.terminal.print_lines(&lines)?;
        Ok(())
    }

    fn assess(&mut self) -> Result<()> {
        let mut wizard = OnboardingWizard::new();

        loop {
            self.terminal.print_line(&format!(
                "Step {} of {TOTAL_STEPS} ({}%)",
                wizard.step_number(),
                wizard.progress_percent()
            ))?;

            match wizard.step() {
                Step::CompanyInfo => {
                    let Some(info) = self.prompt_company_info(wizard.company_info())? else {
                        return self.cancel_assessment();
                    };
                    wizard.set_company_info(info);
                    if !wizard.next() {
                        self.terminal
                            .print_line("Company, role and size are all required.")?;
                    }
                }
                Step::Question(dimension) => {
                    let questions: &'static [Question] = &QUESTIONNAIRE;
                    let Some(question) = questions
                        .iter()
                        .find(|question| question.dimension == dimension)
                    else {
                        return self.cancel_assessment();
                    };
                    self.terminal.print_line(question.title)?;
                    self.terminal.print_line(question.prompt)?;
                    for (index, option) in question.options.iter().enumerate() {
                        self.terminal.print_line(&format!("  {}) {option}", index + 1))?;
                    }

                    let Some(input) = self.terminal.prompt_line("Answer 1-5 (b = back): ")? else {
                        return self.cancel_assessment();
                    };
                    if input.eq_ignore_ascii_case("b") {
                        wizard.previous();
                        continue;
                    }
                    let answered = input
                        .parse::<u8>()
                        .map_err(|_| input.clone())
                        .and_then(|value| wizard.answer(value).map_err(|error| error.to_string()));
                    match answered {
                        Ok(()) => {
                            wizard.next();
                        }
                        Err(reason) => self
                            .terminal
                            .print_line(&format!("Invalid answer: {reason}"))?,
                    }
                }
                Step::Complete => break,
            }
        }

        match wizard.finish(self.session, self.persist_assessment) {
            Ok(result) => {
                self.terminal
                    .print_lines(&render::recommendation_lines(result.score))?;
                self.last_assessment = Some(result);
            }
            Err(error) => self
                .terminal
                .print_line(&format!("Assessment not saved: {error}"))?,
        }
        Ok(())
    }

    fn prompt_company_info(&mut self, current: &CompanyInfo) -> Result<Option<CompanyInfo>> {
        let default_company = if current.company.is_empty() {
            self.session
                .current()
                .and_then(|profile| profile.company.clone())
                .unwrap_or_default()
        } else {
            current.company.clone()
        };

        let Some(company) = self
            .terminal
            .prompt_line(&format!("Company name ({default_company}): "))?
        else {
            return Ok(None);
        };
        let Some(job_title) = self.terminal.prompt_line("Your role in the company: ")? else {
            return Ok(None);
        };
        let Some(employees) = self.terminal.prompt_line("Number of employees: ")? else {
            return Ok(None);
        };

        Ok(Some(CompanyInfo {
            company: if company.trim().is_empty() {
                default_company
            } else {
                company
            },
            job_title,
            employees,
        }))
    }

    fn cancel_assessment(&mut self) -> Result<()> {
        self.terminal.print_line("Assessment cancelled.")?;
        Ok(())
    }
}
