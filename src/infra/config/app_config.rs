use serde::{Deserialize, Serialize};

use crate::infra::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub onboarding: OnboardingConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Log to this file instead of stderr.
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub oauth_redirect_url: String,
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            oauth_redirect_url: "http://localhost:5173".to_owned(),
            request_timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    /// Both endpoint settings are mandatory; the client cannot start without them.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.url.trim().is_empty() {
            return Err(AppError::MissingConfig {
                field: "backend.url",
            });
        }
        if self.anon_key.trim().is_empty() {
            return Err(AppError::MissingConfig {
                field: "backend.anon_key",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    pub auto_reply_delay_ms: u64,
    pub analyst_id: String,
    pub analyst_name: String,
    pub auto_reply_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            auto_reply_delay_ms: 2_000,
            analyst_id: "analyst-1".to_owned(),
            analyst_name: "María González".to_owned(),
            auto_reply_text: "Thanks for your message. I'm reviewing your consultation and will get back to you shortly with more detail.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingConfig {
    pub persist_assessment: bool,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            persist_assessment: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DemoConfig {
    pub seed_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_config_is_rejected() {
        let err = BackendConfig::default().validate().expect_err("must fail");

        assert!(matches!(
            err,
            AppError::MissingConfig {
                field: "backend.url"
            }
        ));
    }

    #[test]
    fn blank_anon_key_is_rejected() {
        let config = BackendConfig {
            url: "https://project.example.co".to_owned(),
            anon_key: "   ".to_owned(),
            ..BackendConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(AppError::MissingConfig {
                field: "backend.anon_key"
            })
        ));
    }
}
