//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod chat;
pub mod consultations;
pub mod context;
pub mod onboarding;
pub mod session;
pub mod workflow;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
