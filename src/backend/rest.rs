use std::{fmt, time::Duration};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::runtime::{Builder, Runtime};
use url::Url;

use super::{
    AuthUser, BackendError, IdentityBackend, NewProfileRow, OAuthProvider, SignUpMetadata,
};
use crate::{
    domain::profile::{ProfileUpdate, UserId, UserProfile},
    infra::config::BackendConfig,
};

const PROFILE_TABLE: &str = "users";
const ERROR_MESSAGE_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

/// Blocking adapter over the hosted REST API.
///
/// Requests run on a private current-thread runtime so callers stay synchronous.
pub struct RestBackend {
    rt: Runtime,
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.url)
            .map_err(|error| BackendError::Runtime(format!("invalid backend url: {error}")))?;

        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                BackendError::Runtime(format!("failed to initialize async runtime: {error}"))
            })?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|error| BackendError::Runtime(format!("failed to build http client: {error}")))?;

        Ok(Self {
            rt,
            http,
            base_url,
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|error| BackendError::Runtime(format!("invalid endpoint {path}: {error}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn execute(&self, request: RequestBuilder) -> Result<Value, BackendError> {
        self.rt.block_on(async {
            let response = request
                .send()
                .await
                .map_err(|error| BackendError::Transport(error.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|error| BackendError::Transport(error.to_string()))?;

            if !status.is_success() {
                return Err(BackendError::Rejected {
                    status: status.as_u16(),
                    message: error_message(status, &body),
                });
            }

            if body.trim().is_empty() {
                return Ok(Value::Null);
            }

            serde_json::from_str(&body).map_err(|error| BackendError::Decode(error.to_string()))
        })
    }

    fn authenticate(&mut self, body: Value) -> Result<AuthUser, BackendError> {
        let (token, user) = parse_auth_body(&body)?;
        if token.is_some() {
            self.access_token = token;
        }
        Ok(user)
    }

    fn profile_rows(&self, method: Method, id: Option<&UserId>) -> Result<RequestBuilder, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{PROFILE_TABLE}"))?;
        if let Some(id) = id {
            url.query_pairs_mut()
                .append_pair("id", &format!("eq.{}", id.as_str()))
                .append_pair("select", "*");
        }
        Ok(self
            .request(method, url)
            .header("Prefer", "return=representation"))
    }
}

impl IdentityBackend for RestBackend {
    fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let body = self.execute(self.request(Method::POST, url).json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        })))?;
        self.authenticate(body)
    }

    fn sign_in_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = self.execute(self.request(Method::POST, url).json(&json!({
            "email": email,
            "password": password,
        })))?;
        self.authenticate(body)
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, BackendError> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url.into())
    }

    fn sign_out(&mut self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let request = self.request(Method::POST, url);
        self.access_token = None;
        self.execute(request).map(|_| ())
    }

    fn insert_profile(&mut self, row: &NewProfileRow) -> Result<UserProfile, BackendError> {
        let request = self.profile_rows(Method::POST, None)?.json(row);
        first_row(self.execute(request)?)
    }

    fn select_profile(&mut self, id: &UserId) -> Result<UserProfile, BackendError> {
        let request = self.profile_rows(Method::GET, Some(id))?;
        first_row(self.execute(request)?)
    }

    fn update_profile(
        &mut self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let request = self.profile_rows(Method::PATCH, Some(id))?.json(update);
        first_row(self.execute(request)?)
    }
}

/// Auth responses carry either a session (`access_token` + `user`) or a bare user.
fn parse_auth_body(body: &Value) -> Result<(Option<String>, AuthUser), BackendError> {
    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let user = body.get("user").unwrap_or(body);

    let id = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Decode("auth response has no user id".to_owned()))?;
    let email = user
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok((
        token,
        AuthUser {
            id: UserId::new(id),
            email: email.to_owned(),
        },
    ))
}

fn first_row(body: Value) -> Result<UserProfile, BackendError> {
    let row = match body {
        Value::Array(rows) => rows.into_iter().next(),
        Value::Null => None,
        row => Some(row),
    }
    .ok_or(BackendError::MissingRow {
        table: PROFILE_TABLE,
    })?;

    serde_json::from_value(row).map_err(|error| BackendError::Decode(error.to_string()))
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ERROR_MESSAGE_KEYS
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            url: "https://project.example.co".to_owned(),
            anon_key: "anon".to_owned(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn parses_session_shaped_auth_body() {
        let body = json!({
            "access_token": "jwt",
            "user": { "id": "u-1", "email": "ana@example.com" }
        });

        let (token, user) = parse_auth_body(&body).expect("auth body should parse");

        assert_eq!(token.as_deref(), Some("jwt"));
        assert_eq!(user.id, UserId::new("u-1"));
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn parses_bare_user_auth_body() {
        let body = json!({ "id": "u-2", "email": "bo@example.com" });

        let (token, user) = parse_auth_body(&body).expect("auth body should parse");

        assert_eq!(token, None);
        assert_eq!(user.id, UserId::new("u-2"));
    }

    #[test]
    fn auth_body_without_id_is_a_decode_error() {
        let err = parse_auth_body(&json!({ "user": null })).expect_err("must fail");

        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn empty_row_set_is_missing_row() {
        let err = first_row(json!([])).expect_err("must fail");

        assert_eq!(err, BackendError::MissingRow { table: "users" });
    }

    #[test]
    fn first_row_decodes_profile() {
        let profile = first_row(json!([{
            "id": "u-1",
            "email": "ana@example.com",
            "name": "Ana",
            "role": "client",
            "free_consultations_used": 0
        }]))
        .expect("row should decode");

        assert_eq!(profile.name, "Ana");
    }

    #[test]
    fn error_message_prefers_backend_text() {
        let message = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );

        assert_eq!(message, "Invalid login credentials");
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            "Service Unavailable"
        );
    }

    #[test]
    fn oauth_url_carries_provider_and_redirect() {
        let backend = RestBackend::new(&config()).expect("backend should build");

        let url = backend
            .oauth_authorize_url(OAuthProvider::Google, "http://localhost:5173")
            .expect("url should build");

        assert!(url.starts_with("https://project.example.co/auth/v1/authorize?"));
        assert!(url.contains("provider=google"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A5173"));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = RestBackend::new(&BackendConfig {
            url: "not a url".to_owned(),
            ..config()
        })
        .expect_err("must fail");

        assert!(matches!(err, BackendError::Runtime(_)));
    }
}
