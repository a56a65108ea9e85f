//! Sign-in gate shown before the console: log in, register or start Google sign-in.

use std::io;

use crate::{
    domain::clock::Clock,
    infra::contracts::ExternalOpener,
    usecases::session::SessionStore,
};

use super::terminal::Terminal;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub login_attempts: usize,
    pub register_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            login_attempts: 3,
            register_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    SignedIn,
    Exit,
}

enum StepOutcome {
    SignedIn,
    BackToMenu,
    Cancelled,
}

pub fn run_auth_gate<C: Clock>(
    terminal: &mut dyn Terminal,
    session: &mut SessionStore<C>,
    opener: &dyn ExternalOpener,
    retry_policy: &RetryPolicy,
) -> io::Result<GateOutcome> {
    terminal.print_line("Welcome to DataConsult.")?;

    loop {
        terminal.print_line("[1] Log in  [2] Register  [3] Continue with Google  [4] Quit")?;
        let Some(choice) = terminal.prompt_line("Choice: ")? else {
            return Ok(GateOutcome::Exit);
        };

        let outcome = match choice.trim() {
            "1" | "login" => login(terminal, session, retry_policy.login_attempts)?,
            "2" | "register" => register(terminal, session, retry_policy.register_attempts)?,
            "3" | "google" => google(terminal, session, opener)?,
            "4" | "quit" | "q" => return Ok(GateOutcome::Exit),
            other => {
                terminal.print_line(&format!("Unknown choice `{other}`."))?;
                StepOutcome::BackToMenu
            }
        };

        match outcome {
            StepOutcome::SignedIn => {
                if let Some(profile) = session.current() {
                    terminal.print_line(&format!(
                        "Signed in as {} ({}).",
                        profile.name,
                        profile.role.as_str()
                    ))?;
                }
                return Ok(GateOutcome::SignedIn);
            }
            StepOutcome::BackToMenu => continue,
            StepOutcome::Cancelled => {
                terminal.print_line("Input cancelled (EOF).")?;
                return Ok(GateOutcome::Exit);
            }
        }
    }
}

fn login<C: Clock>(
    terminal: &mut dyn Terminal,
    session: &mut SessionStore<C>,
    attempts: usize,
) -> io::Result<StepOutcome> {
    for attempt in 1..=attempts {
        let attempts_left = attempts.saturating_sub(attempt);
        let Some(email) = prompt_email(terminal)? else {
            return Ok(StepOutcome::Cancelled);
        };
        let Some(password) = terminal.prompt_secret("Password: ")? else {
            return Ok(StepOutcome::Cancelled);
        };

        match session.login(&email, &password) {
            Ok(_) => return Ok(StepOutcome::SignedIn),
            Err(error) => terminal.print_line(&format!(
                "Login failed: {error}. Attempts left: {attempts_left}"
            ))?,
        }
    }

    terminal.print_line("Too many failed logins.")?;
    Ok(StepOutcome::BackToMenu)
}

fn register<C: Clock>(
    terminal: &mut dyn Terminal,
    session: &mut SessionStore<C>,
    attempts: usize,
) -> io::Result<StepOutcome> {
    for attempt in 1..=attempts {
        let attempts_left = attempts.saturating_sub(attempt);
        let Some(email) = prompt_email(terminal)? else {
            return Ok(StepOutcome::Cancelled);
        };
        let Some(password) = terminal.prompt_secret("Password: ")? else {
            return Ok(StepOutcome::Cancelled);
        };
        if password.chars().count() < MIN_PASSWORD_LEN {
            terminal.print_line(&format!(
                "Password must have at least {MIN_PASSWORD_LEN} characters. Attempts left: {attempts_left}"
            ))?;
            continue;
        }
        let Some(name) = terminal.prompt_line("Full name: ")? else {
            return Ok(StepOutcome::Cancelled);
        };
        if name.trim().is_empty() {
            terminal.print_line(&format!(
                "Name is required. Attempts left: {attempts_left}"
            ))?;
            continue;
        }
        let Some(company) = terminal.prompt_line("Company (optional): ")? else {
            return Ok(StepOutcome::Cancelled);
        };
        let company = Some(company.trim()).filter(|value| !value.is_empty());

        match session.register(&email, &password, name.trim(), company) {
            Ok(_) => return Ok(StepOutcome::SignedIn),
            Err(error) => terminal.print_line(&format!(
                "Registration failed: {error}. Attempts left: {attempts_left}"
            ))?,
        }
    }

    terminal.print_line("Registration failed too many times.")?;
    Ok(StepOutcome::BackToMenu)
}

/// Opens the provider page. The redirect lands in the browser, so the
/// console stays signed out and returns to the menu.
fn google<C: Clock>(
    terminal: &mut dyn Terminal,
    session: &mut SessionStore<C>,
    opener: &dyn ExternalOpener,
) -> io::Result<StepOutcome> {
    let url = match session.login_with_google() {
        Ok(url) => url,
        Err(error) => {
            terminal.print_line(&format!("Google sign-in failed: {error}"))?;
            return Ok(StepOutcome::BackToMenu);
        }
    };

    if let Err(error) = opener.open(&url) {
        tracing::warn!(error = %error, "failed to open browser for google sign-in");
    }
    terminal.print_line("Continue in your browser:")?;
    terminal.print_line(&url)?;
    terminal.print_line("Once your account exists, log in here with email and password.")?;

    Ok(StepOutcome::BackToMenu)
}

fn prompt_email(terminal: &mut dyn Terminal) -> io::Result<Option<String>> {
    loop {
        let Some(email) = terminal.prompt_line("Email: ")? else {
            return Ok(None);
        };
        if is_plausible_email(&email) {
            return Ok(Some(email));
        }
        terminal.print_line("Enter an address like name@company.com.")?;
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::memory::InMemoryBackend,
        domain::{clock::ManualClock, profile::Role},
        infra::stubs::RecordingOpener,
        test_support::client_profile,
        ui::terminal::fake::FakeTerminal,
    };

    fn session_with<'a>(
        backend: &InMemoryBackend,
        clock: &'a ManualClock,
    ) -> SessionStore<&'a ManualClock> {
        SessionStore::new(Box::new(backend.clone()), clock, "http://localhost:5173")
    }

    #[test]
    fn logs_in_after_a_wrong_password() {
        let backend =
            InMemoryBackend::new().with_account("u-1@example.com", "secret1", Some(client_profile("u-1")));
        let clock = ManualClock::at(2025, 1, 20);
        let mut session = session_with(&backend, &clock);
        let mut terminal = FakeTerminal::new(vec![
            Some("1"),
            Some("u-1@example.com"),
            Some("nope"),
            Some("u-1@example.com"),
            Some("secret1"),
        ]);

        let outcome = run_auth_gate(
            &mut terminal,
            &mut session,
            &RecordingOpener::default(),
            &RetryPolicy::default(),
        )
        .expect("gate should run");

        assert_eq!(outcome, GateOutcome::SignedIn);
        assert!(terminal.printed("Login failed: Invalid login credentials. Attempts left: 2"));
        assert!(terminal.printed("Signed in as Demo User (client)."));
        assert_eq!(terminal.secret_prompts, 2);
    }

    #[test]
    fn exhausted_login_attempts_return_to_menu() {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::at(2025, 1, 20);
        let mut session = session_with(&backend, &clock);
        let mut terminal = FakeTerminal::new(vec![
            Some("1"),
            Some("a@example.com"),
            Some("x"),
            Some("4"),
        ]);

        let outcome = run_auth_gate(
            &mut terminal,
            &mut session,
            &RecordingOpener::default(),
            &RetryPolicy {
                login_attempts: 1,
                register_attempts: 1,
            },
        )
        .expect("gate should run");

        assert_eq!(outcome, GateOutcome::Exit);
        assert!(terminal.printed("Too many failed logins."));
        assert!(session.current().is_none());
    }

    #[test]
    fn registers_a_client_and_skips_blank_company() {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::at(2025, 1, 20);
        let mut session = session_with(&backend, &clock);
        let mut terminal = FakeTerminal::new(vec![
            Some("2"),
            Some("not-an-email"),
            Some("ana@example.com"),
            Some("short"),
            Some("ana@example.com"),
            Some("longenough"),
            Some("Ana"),
            Some("  "),
        ]);

        let outcome = run_auth_gate(
            &mut terminal,
            &mut session,
            &RecordingOpener::default(),
            &RetryPolicy::default(),
        )
        .expect("gate should run");

        assert_eq!(outcome, GateOutcome::SignedIn);
        assert!(terminal.printed("Enter an address like name@company.com."));
        assert!(terminal.printed("at least 6 characters"));
        let profile = session.current().expect("identity is set");
        assert_eq!(profile.role, Role::Client);
        assert_eq!(profile.company, None);
    }

    #[test]
    fn google_opens_browser_and_stays_signed_out() {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::at(2025, 1, 20);
        let mut session = session_with(&backend, &clock);
        let opener = RecordingOpener::default();
        let mut terminal = FakeTerminal::new(vec![Some("3"), None]);

        let outcome = run_auth_gate(&mut terminal, &mut session, &opener, &RetryPolicy::default())
            .expect("gate should run");

        assert_eq!(outcome, GateOutcome::Exit);
        let opened = opener.opened.borrow();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].contains("provider=google"));
        assert!(terminal.printed(&opened[0]));
        assert!(session.current().is_none());
    }

    #[test]
    fn eof_mid_step_exits() {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::at(2025, 1, 20);
        let mut session = session_with(&backend, &clock);
        let mut terminal = FakeTerminal::new(vec![Some("1"), Some("a@example.com"), None]);

        let outcome = run_auth_gate(
            &mut terminal,
            &mut session,
            &RecordingOpener::default(),
            &RetryPolicy::default(),
        )
        .expect("gate should run");

        assert_eq!(outcome, GateOutcome::Exit);
        assert!(terminal.printed("Input cancelled (EOF)."));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_plausible_email("ana@example.com"));
        assert!(!is_plausible_email("ana@example"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ana @example.com"));
    }
}
