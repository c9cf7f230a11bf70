// List the relations visible to the model

use nlsql_chain::DataStore;

use super::{open_database, Command};
use crate::{error::CliResult, settings::Settings};

/// `nlsql tables`
pub struct TablesCommand {
    settings: Settings,
}

impl TablesCommand {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// One relation name per line
    pub async fn render(store: &dyn DataStore) -> CliResult<String> {
        Ok(store.list_relation_names().await?.join("\n"))
    }
}

#[async_trait::async_trait]
impl Command for TablesCommand {
    async fn execute(&self) -> CliResult<()> {
        let db = open_database(&self.settings.database)?;
        println!("{}", Self::render(&db).await?);
        Ok(())
    }
}
