use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::{
    AuthUser, BackendError, IdentityBackend, NewProfileRow, OAuthProvider, SignUpMetadata,
};
use crate::domain::profile::{ProfileUpdate, UserId, UserProfile};

/// In-process backend for tests. Clones share state so a test can keep a
/// handle after boxing one into a `SessionStore`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub principals: HashMap<String, (String, UserId)>,
    pub profiles: HashMap<UserId, UserProfile>,
    pub signed_in: Option<UserId>,
    pub next_id: u32,
    pub fail_sign_up: Option<BackendError>,
    pub fail_sign_in: Option<BackendError>,
    pub fail_sign_out: Option<BackendError>,
    pub fail_insert: Option<BackendError>,
    pub fail_update: Option<BackendError>,
    /// Applied by the "server" on every update, on top of the caller's fields.
    pub server_side_update: Option<ProfileUpdate>,
    pub calls: Vec<&'static str>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::cell::RefMut<'_, MemoryState> {
        self.state.borrow_mut()
    }

    pub fn with_account(self, email: &str, password: &str, profile: Option<UserProfile>) -> Self {
        {
            let mut state = self.state();
            let id = profile
                .as_ref()
                .map(|profile| profile.id.clone())
                .unwrap_or_else(|| UserId::new(format!("auth-{email}")));
            state
                .principals
                .insert(email.to_owned(), (password.to_owned(), id.clone()));
            if let Some(profile) = profile {
                state.profiles.insert(id, profile);
            }
        }
        self
    }
}

impl IdentityBackend for InMemoryBackend {
    fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<AuthUser, BackendError> {
        let mut state = self.state();
        state.calls.push("sign_up");
        if let Some(error) = state.fail_sign_up.take() {
            return Err(error);
        }
        if state.principals.contains_key(email) {
            return Err(BackendError::Rejected {
                status: 422,
                message: "User already registered".to_owned(),
            });
        }

        state.next_id += 1;
        let id = UserId::new(format!("user-{}", state.next_id));
        state
            .principals
            .insert(email.to_owned(), (password.to_owned(), id.clone()));
        state.signed_in = Some(id.clone());

        Ok(AuthUser {
            id,
            email: email.to_owned(),
        })
    }

    fn sign_in_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let mut state = self.state();
        state.calls.push("sign_in");
        if let Some(error) = state.fail_sign_in.take() {
            return Err(error);
        }

        let id = match state.principals.get(email) {
            Some((stored, id)) if stored == password => id.clone(),
            _ => {
                return Err(BackendError::Rejected {
                    status: 400,
                    message: "Invalid login credentials".to_owned(),
                })
            }
        };
        state.signed_in = Some(id.clone());

        Ok(AuthUser {
            id,
            email: email.to_owned(),
        })
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, BackendError> {
        self.state().calls.push("oauth");
        Ok(format!(
            "memory://authorize?provider={}&redirect_to={redirect_to}",
            provider.as_str()
        ))
    }

    fn sign_out(&mut self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push("sign_out");
        state.signed_in = None;
        match state.fail_sign_out.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn insert_profile(&mut self, row: &NewProfileRow) -> Result<UserProfile, BackendError> {
        let mut state = self.state();
        state.calls.push("insert_profile");
        if let Some(error) = state.fail_insert.take() {
            return Err(error);
        }

        let profile = UserProfile {
            id: row.id.clone(),
            email: row.email.clone(),
            name: row.name.clone(),
            company: row.company.clone(),
            role: row.role,
            avatar_url: None,
            company_logo_url: None,
            maturity_level: None,
            maturity_assessment: None,
            free_consultations_used: row.free_consultations_used,
            created_at: None,
            updated_at: None,
        };
        state.profiles.insert(row.id.clone(), profile.clone());
        Ok(profile)
    }

    fn select_profile(&mut self, id: &UserId) -> Result<UserProfile, BackendError> {
        let mut state = self.state();
        state.calls.push("select_profile");
        state
            .profiles
            .get(id)
            .cloned()
            .ok_or(BackendError::MissingRow { table: "users" })
    }

    fn update_profile(
        &mut self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let mut state = self.state();
        state.calls.push("update_profile");
        if let Some(error) = state.fail_update.take() {
            return Err(error);
        }

        let server_side = state.server_side_update.clone();
        let stored = state
            .profiles
            .get_mut(id)
            .ok_or(BackendError::MissingRow { table: "users" })?;
        *stored = stored.merged(update);
        if let Some(extra) = server_side {
            *stored = stored.merged(&extra);
        }
        Ok(stored.clone())
    }
}
