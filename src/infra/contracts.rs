use anyhow::Result;

use crate::infra::config::AppConfig;

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Hands a URL to something outside the process, typically the system browser.
pub trait ExternalOpener {
    fn open(&self, target: &str) -> Result<()>;
}
