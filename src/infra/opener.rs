use anyhow::{Context, Result};

use crate::infra::contracts::ExternalOpener;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&self, target: &str) -> Result<()> {
        open::that(target).with_context(|| format!("failed to open {target} in a browser"))
    }
}
