// Show the effective settings

use super::Command;
use crate::{error::CliResult, settings::Settings};

/// `nlsql config`
pub struct ConfigCommand {
    settings: Settings,
}

impl ConfigCommand {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> CliResult<()> {
        print!("{}", self.settings.to_redacted_toml()?);
        Ok(())
    }
}
