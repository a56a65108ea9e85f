//! Domain layer: core entities, the session-local store and derived views.

pub mod board;
pub mod calendar;
pub mod clock;
pub mod consultation;
pub mod maturity;
pub mod message;
pub mod profile;
pub mod store;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
