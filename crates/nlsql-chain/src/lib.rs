//! # nlsql-chain
//!
//! **Purpose**: Answer natural-language questions against a SQL data store
//!
//! A [`QueryChain`] renders the store schema into a prompt, asks a language
//! model for a query, executes it, asks for corrections when the store rejects
//! the query, and optionally turns the result into a natural-language answer.
//! A [`SequentialQueryChain`] first asks the model which relations matter and
//! then runs a [`QueryChain`] restricted to them.
//!
//! ## Collaborators
//!
//! - [`LanguageModel`]: prompt + stop sequences in, generated text out
//! - [`DataStore`]: relation listing, schema text, query execution with
//!   [`ErrorKind::Fatal`] / [`ErrorKind::Recoverable`] classification
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nlsql_chain::{ChainConfig, QueryChain, testing::{ScriptedLanguageModel, ScriptedStore}};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(ScriptedLanguageModel::new(["SELECT COUNT(*) FROM orders;"]));
//! let store = Arc::new(ScriptedStore::new().then(Ok("42".to_string())));
//!
//! let chain = QueryChain::new(llm, store, ChainConfig::new().return_raw_result(true))?;
//! let result = chain.run_question("How many orders?").await?;
//! assert_eq!(result.answer, "42");
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod sequential;
pub mod store;
pub mod testing;

pub use chain::QueryChain;
pub use config::ChainConfig;
pub use error::{
    ChainError, DeciderParseError, ErrorKind, ExecutionErrorKind, LanguageModelError,
    PromptError, Result, StoreError,
};
pub use llm::LanguageModel;
pub use models::{ChainResult, ExecutionOutcome, QueryRequest, TranslationContext};
pub use parser::parse_relation_list;
pub use prompt::PromptTemplate;
pub use retry::{AttemptState, RetryPolicy};
pub use sequential::SequentialQueryChain;
pub use store::DataStore;
