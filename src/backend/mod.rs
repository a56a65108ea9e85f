//! Remote identity/record service: auth principals and the `users` profile table.

#[cfg(test)]
pub mod memory;
pub mod rest;

use thiserror::Error;

use crate::domain::profile::{ProfileUpdate, Role, UserId, UserProfile};

pub use rest::RestBackend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("no {table} row matched the request")]
    MissingRow { table: &'static str },
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("backend runtime unavailable: {0}")]
    Runtime(String),
}

/// Authenticated principal as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

/// Profile attributes attached to the auth principal at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SignUpMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Insert payload for the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NewProfileRow {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub role: Role,
    pub free_consultations_used: u32,
}

impl NewProfileRow {
    pub fn client(user: &AuthUser, metadata: &SignUpMetadata) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: metadata.name.clone(),
            company: metadata.company.clone(),
            role: Role::Client,
            free_consultations_used: 0,
        }
    }
}

pub trait IdentityBackend {
    fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser, BackendError>;

    fn sign_in_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError>;

    /// URL the user must visit to finish a third-party sign-in.
    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, BackendError>;

    fn sign_out(&mut self) -> Result<(), BackendError>;

    fn insert_profile(&mut self, row: &NewProfileRow) -> Result<UserProfile, BackendError>;

    fn select_profile(&mut self, id: &UserId) -> Result<UserProfile, BackendError>;

    /// Applies `update` and returns the row as stored after the update.
    fn update_profile(
        &mut self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError>;
}

/// Returns the backend module name for smoke checks.
pub fn module_name() -> &'static str {
    "backend"
}
