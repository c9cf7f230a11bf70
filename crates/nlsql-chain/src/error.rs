//! Error types for query chains

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification a data store attaches to a failed call.
///
/// The retry loop looks only at this value, never at the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The store or connection is broken; regenerating the query cannot help
    Fatal,
    /// The query text itself was rejected; a corrected query may succeed
    Recoverable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Fatal => write!(f, "fatal"),
            ErrorKind::Recoverable => write!(f, "recoverable"),
        }
    }
}

/// Error raised by a [`DataStore`](crate::store::DataStore) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} store error: {message}")]
pub struct StoreError {
    /// Retry classification
    pub kind: ErrorKind,
    /// Message reported by the store
    pub message: String,
}

impl StoreError {
    /// Create a fatal (connectivity / auth) error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Fatal,
            message: message.into(),
        }
    }

    /// Create a recoverable (malformed query) error
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Recoverable,
            message: message.into(),
        }
    }

    /// Whether the retry loop must stop on this error
    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }
}

/// Error raised by a [`LanguageModel`](crate::llm::LanguageModel) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LanguageModelError {
    /// Human-readable failure description (never contains credentials)
    pub message: String,
}

impl LanguageModelError {
    /// Create a new language model error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why an execution failed terminally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionErrorKind {
    /// The store signalled a connectivity or authentication failure
    Fatal,
    /// Every allowed attempt failed with a recoverable error
    RetriesExhausted,
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionErrorKind::Fatal => write!(f, "fatal"),
            ExecutionErrorKind::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

/// The decider step produced output that is not a usable relation list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeciderParseError {
    /// Nothing but whitespace was generated
    #[error("decider returned no relation names")]
    Empty,

    /// A comma-separated item was blank, e.g. `orders,,customers`
    #[error("empty relation name at position {position} in {output:?}")]
    EmptyItem { position: usize, output: String },

    /// An item looks like prose rather than a single relation name
    #[error("not a relation name: {0:?}")]
    NotARelationName(String),

    /// The decider named relations the store does not have
    #[error("unknown relations: {}", .0.join(", "))]
    UnknownRelations(Vec<String>),
}

/// Prompt template construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// A `{placeholder}` in the template is not a declared input variable
    #[error("template '{template}' uses undeclared variable '{variable}'")]
    UndeclaredVariable { template: String, variable: String },

    /// A `{` was opened but never closed
    #[error("template '{template}' has an unterminated placeholder")]
    UnterminatedPlaceholder { template: String },
}

/// Errors surfaced by [`QueryChain`](crate::QueryChain) and
/// [`SequentialQueryChain`](crate::SequentialQueryChain)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// The language model call failed; never retried
    #[error("Translation error: {0}")]
    Translation(#[from] LanguageModelError),

    /// Executing the generated query failed terminally
    #[error("Execution error ({kind}) after {attempts} attempt(s): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        /// Last message reported by the store
        message: String,
        /// Number of execution attempts made before giving up
        attempts: usize,
    },

    /// The decider output could not be turned into relation names; never retried
    #[error("Decider parse error: {0}")]
    DeciderParse(#[from] DeciderParseError),

    /// Invalid prompt template
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Invalid chain configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChainError {
    /// Build an execution error
    pub fn execution(kind: ExecutionErrorKind, message: impl Into<String>, attempts: usize) -> Self {
        ChainError::Execution {
            kind,
            message: message.into(),
            attempts,
        }
    }

    /// The execution error kind, if this is an execution error
    pub fn execution_kind(&self) -> Option<ExecutionErrorKind> {
        match self {
            ChainError::Execution { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type for chain operations
pub type Result<T> = std::result::Result<T, ChainError>;
