// CLI error types

use nlsql_chain::{ChainError, ExecutionErrorKind, StoreError};
use nlsql_providers::ProviderError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(err.to_string())
    }
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {}\n\nRun 'nlsql --help' for usage information.", message)
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(msg) => {
                format!("Configuration error: {}\n\nRun 'nlsql config' to check the effective settings.", msg)
            }
            CliError::Provider(e) => {
                format!("Provider error: {}\n\nCheck the [provider] section of your configuration.", e)
            }
            CliError::Database(e) => {
                format!("Database error: {}\n\nCheck the database path and table filters.", e.message)
            }
            CliError::Chain(e) => chain_message(e),
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

fn chain_message(err: &ChainError) -> String {
    match err {
        ChainError::Translation(e) => {
            format!("Could not generate a query: {}\n\nCheck that the language model is reachable.", e)
        }
        ChainError::Execution {
            kind: ExecutionErrorKind::Fatal,
            message,
            ..
        } => format!("The database could not be used: {}", message),
        ChainError::Execution {
            kind: ExecutionErrorKind::RetriesExhausted,
            message,
            attempts,
        } => format!(
            "The generated query still failed after {} attempt(s): {}\n\nTry --max-tries or rephrase the question.",
            attempts, message
        ),
        ChainError::DeciderParse(e) => {
            format!("Could not tell which tables to use: {}\n\nTry again without --sequential.", e)
        }
        other => other.to_string(),
    }
}

pub type CliResult<T> = Result<T, CliError>;
