// Command handlers for the nlsql CLI

pub mod ask;
pub mod config;
pub mod schema;
pub mod tables;

pub use ask::AskCommand;
pub use config::ConfigCommand;
pub use schema::SchemaCommand;
pub use tables::TablesCommand;

use nlsql_sqlite::SqliteDatabase;

use crate::{
    error::{CliError, CliResult},
    settings::DatabaseSettings,
};

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}

/// Open the configured database with its table filters
pub fn open_database(settings: &DatabaseSettings) -> CliResult<SqliteDatabase> {
    let path = settings.path.as_ref().ok_or_else(|| CliError::InvalidArgument {
        message: "no database given; pass --database or set database.path".to_string(),
    })?;

    let db = SqliteDatabase::open(path)?.with_options(settings.sqlite_options())?;
    Ok(db)
}
