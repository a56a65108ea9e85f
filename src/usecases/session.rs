//! Session store: the current identity and the remote calls that change it.
//!
//! Every backend failure collapses into [`SessionError::Remote`] carrying the
//! backend's message. Nothing is retried.

use thiserror::Error;

use crate::{
    backend::{BackendError, IdentityBackend, NewProfileRow, OAuthProvider, SignUpMetadata},
    domain::{
        clock::Clock,
        profile::{ProfileUpdate, UserProfile},
    },
    infra::secrets::{mask_email, redact_text},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{message}")]
    Remote { message: String },
    #[error("sign in first")]
    NoIdentity,
}

impl SessionError {
    fn remote(error: BackendError, fallback: &str) -> Self {
        let message = error.to_string();
        Self::Remote {
            message: if message.is_empty() {
                fallback.to_owned()
            } else {
                message
            },
        }
    }
}

pub struct SessionStore<C> {
    backend: Box<dyn IdentityBackend>,
    clock: C,
    oauth_redirect_url: String,
    current: Option<UserProfile>,
}

impl<C: Clock> SessionStore<C> {
    pub fn new(
        backend: Box<dyn IdentityBackend>,
        clock: C,
        oauth_redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            clock,
            oauth_redirect_url: oauth_redirect_url.into(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    pub fn require_current(&self) -> Result<&UserProfile, SessionError> {
        self.current.as_ref().ok_or(SessionError::NoIdentity)
    }

    /// Creates the auth principal, then its `client` profile row. A failure in
    /// the second step leaves the principal in place.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        company: Option<&str>,
    ) -> Result<&UserProfile, SessionError> {
        let metadata = SignUpMetadata {
            name: name.to_owned(),
            company: company.map(str::to_owned),
        };

        let result = self.backend.sign_up(email, password, &metadata).and_then(|user| {
            let row = NewProfileRow::client(&user, &metadata);
            self.backend.insert_profile(&row).inspect_err(|error| {
                tracing::warn!(
                    user_id = %user.id,
                    error = %redact_text(&error.to_string()),
                    "auth principal created without a profile row"
                );
            })
        });

        let profile = result.map_err(|error| SessionError::remote(error, "Registration failed"))?;
        tracing::info!(user_id = %profile.id, email = %mask_email(email), "registered");
        Ok(self.current.insert(profile))
    }

    /// Authenticates, then loads the profile row. Both failures look the same to the caller.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&UserProfile, SessionError> {
        let result = self
            .backend
            .sign_in_with_password(email, password)
            .and_then(|user| self.backend.select_profile(&user.id));

        let profile = result.map_err(|error| SessionError::remote(error, "Login failed"))?;
        tracing::info!(user_id = %profile.id, role = profile.role.as_str(), "signed in");
        Ok(self.current.insert(profile))
    }

    /// Returns the URL that completes Google sign-in out of band. Identity is not set here.
    pub fn login_with_google(&mut self) -> Result<String, SessionError> {
        let result = self
            .backend
            .oauth_authorize_url(OAuthProvider::Google, &self.oauth_redirect_url);

        result.map_err(|error| SessionError::remote(error, "Google login failed"))
    }

    /// Clears the local identity whatever the remote sign-out does.
    pub fn logout(&mut self) {
        if let Err(error) = self.backend.sign_out() {
            tracing::warn!(error = %redact_text(&error.to_string()), "remote sign-out failed");
        }

        if let Some(profile) = self.current.take() {
            tracing::info!(user_id = %profile.id, "signed out");
        }
    }

    /// Sends `update` with a fresh `updated_at` and adopts the row the backend returns.
    /// Without a current identity this does nothing and returns `Ok(None)`.
    pub fn update_profile(
        &mut self,
        update: ProfileUpdate,
    ) -> Result<Option<&UserProfile>, SessionError> {
        let Some(id) = self.current.as_ref().map(|profile| profile.id.clone()) else {
            return Ok(None);
        };

        let stamped = update.stamped(self.clock.now());
        let result = self.backend.update_profile(&id, &stamped);

        let stored = result.map_err(|error| SessionError::remote(error, "Profile update failed"))?;
        tracing::debug!(user_id = %stored.id, "profile updated");
        Ok(Some(self.current.insert(stored)))
    }
}
