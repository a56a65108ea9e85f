use anyhow::Result;

use crate::{
    backend::{self, IdentityBackend},
    cli::{Cli, Command},
    domain::{
        self,
        clock::{Clock, SystemClock},
        store::DomainStore,
    },
    infra::{self, config::AppConfig, contracts::ExternalOpener, opener::SystemOpener},
    ui::{
        self,
        auth_gate::{run_auth_gate, GateOutcome, RetryPolicy},
        console::{Console, ConsoleExit},
        terminal::{StdTerminal, Terminal},
    },
    usecases::{
        self,
        bootstrap::{self, connect_backend},
        chat::AutoReplyQueue,
        session::SessionStore,
    },
};

pub fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        backend = backend::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    match cli.command_or_default() {
        Command::CheckConfig => {
            println!(
                "Configuration OK. Backend: {}. Log level: {}.",
                context.config.backend.url, context.config.logging.level
            );
        }
        Command::GoogleLogin => {
            let backend = connect_backend(&context.config.backend)?;
            let mut session = SessionStore::new(
                Box::new(backend),
                SystemClock,
                context.config.backend.oauth_redirect_url.clone(),
            );
            let url = session.login_with_google()?;
            if let Err(error) = SystemOpener.open(&url) {
                tracing::warn!(error = %error, "failed to open browser for google sign-in");
            }
            println!("Continue Google sign-in in your browser:");
            println!("{url}");
        }
        Command::Run => {
            let backend = connect_backend(&context.config.backend)?;
            run_console(
                &context.config,
                Box::new(backend),
                SystemClock,
                &mut StdTerminal,
                &SystemOpener,
            )?;
        }
    }

    Ok(())
}

/// Sign-in gate and console, repeated after every logout until the user quits.
///
/// The domain store is created on first sign-in and kept for the whole process.
fn run_console<C: Clock + Copy>(
    config: &AppConfig,
    backend: Box<dyn IdentityBackend>,
    clock: C,
    terminal: &mut dyn Terminal,
    opener: &dyn ExternalOpener,
) -> Result<()> {
    let mut session = SessionStore::new(backend, clock, config.backend.oauth_redirect_url.clone());
    let mut store: Option<DomainStore<C>> = None;
    let mut replies = AutoReplyQueue::new(&config.chat);
    let retry_policy = RetryPolicy::default();

    loop {
        if run_auth_gate(terminal, &mut session, opener, &retry_policy)? == GateOutcome::Exit {
            return Ok(());
        }
        let Some(user_id) = session.current().map(|profile| profile.id.clone()) else {
            continue;
        };

        let store = store.get_or_insert_with(|| {
            if config.demo.seed_data {
                tracing::info!(user_id = %user_id, "seeding demo consultations");
                DomainStore::with_demo_data(clock, &user_id)
            } else {
                DomainStore::new(clock)
            }
        });

        let exit = Console::new(
            terminal,
            store,
            &mut session,
            &mut replies,
            config.onboarding.persist_assessment,
        )
        .run()?;

        if exit == ConsoleExit::Quit {
            tracing::info!(
                consultations = store.consultations().len(),
                messages = store.messages().len(),
                "console closed"
            );
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::memory::InMemoryBackend,
        domain::clock::ManualClock,
        infra::stubs::RecordingOpener,
        test_support::{admin_profile, client_profile},
        ui::terminal::fake::FakeTerminal,
    };

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_account("u-1@example.com", "secret1", Some(client_profile("u-1")))
            .with_account("boss@example.com", "secret2", Some(admin_profile("boss")))
    }

    #[test]
    fn demo_data_is_seeded_for_first_user_and_survives_logout() {
        let backend = backend();
        let clock = ManualClock::at(2025, 1, 20);
        let mut config = AppConfig::default();
        config.demo.seed_data = true;
        let mut terminal = FakeTerminal::new(vec![
            Some("1"),
            Some("u-1@example.com"),
            Some("secret1"),
            Some("board"),
            Some("logout"),
            Some("1"),
            Some("boss@example.com"),
            Some("secret2"),
            Some("move 1 proposal"),
            Some("quit"),
        ]);

        run_console(
            &config,
            Box::new(backend.clone()),
            &clock,
            &mut terminal,
            &RecordingOpener::default(),
        )
        .expect("console should run");

        assert!(terminal.printed("Customer Churn Analysis"));
        assert!(terminal.printed("Signed in as Admin (admin)."));
        assert!(terminal.printed("[1] moved from In analysis to Proposal."));
        assert!(backend.state().calls.contains(&"sign_out"));
    }

    #[test]
    fn empty_store_without_seed_and_eof_at_gate_exits() {
        let clock = ManualClock::at(2025, 1, 20);
        let mut terminal = FakeTerminal::new(vec![
            Some("1"),
            Some("u-1@example.com"),
            Some("secret1"),
            Some("chats"),
            None,
        ]);

        run_console(
            &AppConfig::default(),
            Box::new(backend()),
            &clock,
            &mut terminal,
            &RecordingOpener::default(),
        )
        .expect("console should run");

        assert!(terminal.printed("No conversations found."));
    }
}
