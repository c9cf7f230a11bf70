// Print the schema text the model sees

use nlsql_chain::DataStore;

use super::{open_database, Command};
use crate::{error::CliResult, settings::Settings};

/// `nlsql schema [TABLE...]`
pub struct SchemaCommand {
    tables: Vec<String>,
    settings: Settings,
}

impl SchemaCommand {
    pub fn new(tables: Vec<String>, settings: Settings) -> Self {
        Self { tables, settings }
    }

    /// Schema text for the requested tables, or all when none are given
    pub async fn render(&self, store: &dyn DataStore) -> CliResult<String> {
        let names = (!self.tables.is_empty()).then_some(self.tables.as_slice());
        Ok(store.schema_text(names).await?)
    }
}

#[async_trait::async_trait]
impl Command for SchemaCommand {
    async fn execute(&self) -> CliResult<()> {
        let db = open_database(&self.settings.database)?;
        println!("{}", self.render(&db).await?);
        Ok(())
    }
}
