use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const BACKEND_URL_ENV: &str = "DATACONSULT_BACKEND_URL";
pub const BACKEND_ANON_KEY_ENV: &str = "DATACONSULT_BACKEND_ANON_KEY";

/// Defaults, then the TOML file (if present), then environment overrides.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let mut config = load_file(path)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

fn load_file(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|value| !value.trim().is_empty()) {
        config.backend.url = url;
    }

    if let Some(key) = lookup(BACKEND_ANON_KEY_ENV).filter(|value| !value.trim().is_empty()) {
        config.backend.anon_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::env_lock;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load_file(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"[logging]
level = "debug"

[backend]
url = "https://project.example.co"
anon_key = "anon"

[chat]
auto_reply_delay_ms = 50

[onboarding]
persist_assessment = false
"#,
        )
        .expect("must write test config");

        let config = load_file(Some(&config_path)).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.backend.url, "https://project.example.co");
        assert_eq!(config.backend.anon_key, "anon");
        assert_eq!(config.backend.request_timeout_ms, 10_000);
        assert_eq!(config.chat.auto_reply_delay_ms, 50);
        assert_eq!(config.chat.analyst_name, "María González");
        assert!(!config.onboarding.persist_assessment);
        assert!(!config.demo.seed_data);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[backend\nurl = 1").expect("must write test config");

        let err = load_file(Some(&config_path)).expect_err("must fail");

        assert!(matches!(err, AppError::ConfigParse { ref path, .. } if path == &config_path));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut config = AppConfig::default();
        config.backend.url = "https://from-file.example.co".to_owned();

        apply_env_overrides(&mut config, |key| match key {
            BACKEND_URL_ENV => Some("https://from-env.example.co".to_owned()),
            BACKEND_ANON_KEY_ENV => Some("env-key".to_owned()),
            _ => None,
        });

        assert_eq!(config.backend.url, "https://from-env.example.co");
        assert_eq!(config.backend.anon_key, "env-key");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.backend.anon_key = "file-key".to_owned();

        apply_env_overrides(&mut config, |_| Some("  ".to_owned()));

        assert_eq!(config.backend.anon_key, "file-key");
    }

    #[test]
    fn load_reads_process_environment() {
        let _guard = env_lock();
        let old = env::var_os(BACKEND_ANON_KEY_ENV);
        // SAFETY: env is guarded by process-wide test mutex.
        unsafe { env::set_var(BACKEND_ANON_KEY_ENV, "from-process") };

        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        match old {
            // SAFETY: restoring env while guard is held.
            Some(value) => unsafe { env::set_var(BACKEND_ANON_KEY_ENV, value) },
            // SAFETY: restoring env while guard is held.
            None => unsafe { env::remove_var(BACKEND_ANON_KEY_ENV) },
        }

        assert_eq!(config.backend.anon_key, "from-process");
    }
}
