use std::path::Path;

use crate::{
    backend::RestBackend,
    infra::{
        self,
        config::{BackendConfig, FileConfigAdapter},
        contracts::ConfigAdapter,
        error::AppError,
    },
    usecases::context::AppContext,
};

/// Loads and validates configuration, then installs logging.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(&FileConfigAdapter::new(config_path))?;
    infra::logging::init(&context.config.logging)?;

    tracing::debug!(
        seed_data = context.config.demo.seed_data,
        persist_assessment = context.config.onboarding.persist_assessment,
        "configuration loaded"
    );
    Ok(context)
}

pub fn build_context(config_adapter: &dyn ConfigAdapter) -> Result<AppContext, AppError> {
    let config = config_adapter.load().map_err(AppError::Other)?;
    config.backend.validate()?;

    Ok(AppContext::new(config))
}

pub fn connect_backend(config: &BackendConfig) -> Result<RestBackend, AppError> {
    RestBackend::new(config).map_err(AppError::BackendInit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{config::AppConfig, stubs::StubConfigAdapter};

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.backend.url = "https://project.example.co".to_owned();
        config.backend.anon_key = "anon".to_owned();
        config
    }

    #[test]
    fn builds_context_from_valid_config() {
        let adapter = StubConfigAdapter {
            config: configured(),
        };

        let context = build_context(&adapter).expect("context should build");

        assert_eq!(context.config, configured());
    }

    #[test]
    fn missing_backend_settings_are_fatal() {
        let err = build_context(&StubConfigAdapter::default()).expect_err("must fail");

        assert!(matches!(
            err,
            AppError::MissingConfig {
                field: "backend.url"
            }
        ));
    }

    #[test]
    fn connect_backend_rejects_unparseable_url() {
        let mut config = configured().backend;
        config.url = "not a url".to_owned();

        let err = connect_backend(&config).expect_err("must fail");

        assert!(matches!(err, AppError::BackendInit(_)));
    }

    #[test]
    fn connect_backend_builds_client_for_valid_url() {
        connect_backend(&configured().backend).expect("client should build");
    }
}
