//! UI layer: sign-in gate, command console and text rendering.

pub mod auth_gate;
pub mod command;
pub mod console;
pub mod render;
pub mod terminal;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
