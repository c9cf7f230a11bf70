// nlsql command-line interface

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;
pub mod settings;

pub use error::{CliError, CliResult};
pub use router::{Cli, CommandRouter, Commands};
pub use settings::{DatabaseSettings, Settings, SettingsLoader};
