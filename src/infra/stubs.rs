use std::cell::RefCell;

use anyhow::Result;

use crate::infra::{
    config::AppConfig,
    contracts::{ConfigAdapter, ExternalOpener},
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter {
    pub config: AppConfig,
}

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(self.config.clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingOpener {
    pub opened: RefCell<Vec<String>>,
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, target: &str) -> Result<()> {
        self.opened.borrow_mut().push(target.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_given_config() {
        let adapter = StubConfigAdapter::default();
        let config = adapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn recording_opener_keeps_targets_in_order() {
        let opener = RecordingOpener::default();
        opener.open("https://a.example").expect("open");
        opener.open("https://b.example").expect("open");

        assert_eq!(
            *opener.opened.borrow(),
            vec!["https://a.example".to_owned(), "https://b.example".to_owned()]
        );
    }
}
