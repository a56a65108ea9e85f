use serde::Deserialize;

use crate::infra::config::{
    AppConfig, BackendConfig, ChatConfig, DemoConfig, LogConfig, OnboardingConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub chat: Option<FileChatConfig>,
    pub onboarding: Option<FileOnboardingConfig>,
    pub demo: Option<FileDemoConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(chat) = self.chat {
            chat.merge_into(&mut config.chat);
        }

        if let Some(onboarding) = self.onboarding {
            onboarding.merge_into(&mut config.onboarding);
        }

        if let Some(demo) = self.demo {
            demo.merge_into(&mut config.demo);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub oauth_redirect_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(url) = self.url {
            config.url = url;
        }

        if let Some(anon_key) = self.anon_key {
            config.anon_key = anon_key;
        }

        if let Some(redirect) = self.oauth_redirect_url {
            config.oauth_redirect_url = redirect;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub auto_reply_delay_ms: Option<u64>,
    pub analyst_id: Option<String>,
    pub analyst_name: Option<String>,
    pub auto_reply_text: Option<String>,
}

impl FileChatConfig {
    fn merge_into(self, config: &mut ChatConfig) {
        if let Some(delay_ms) = self.auto_reply_delay_ms {
            config.auto_reply_delay_ms = delay_ms;
        }

        if let Some(analyst_id) = self.analyst_id {
            config.analyst_id = analyst_id;
        }

        if let Some(analyst_name) = self.analyst_name {
            config.analyst_name = analyst_name;
        }

        if let Some(text) = self.auto_reply_text {
            config.auto_reply_text = text;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileOnboardingConfig {
    pub persist_assessment: Option<bool>,
}

impl FileOnboardingConfig {
    fn merge_into(self, config: &mut OnboardingConfig) {
        if let Some(persist) = self.persist_assessment {
            config.persist_assessment = persist;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDemoConfig {
    pub seed_data: Option<bool>,
}

impl FileDemoConfig {
    fn merge_into(self, config: &mut DemoConfig) {
        if let Some(seed_data) = self.seed_data {
            config.seed_data = seed_data;
        }
    }
}
