//! Data models passed through a chain run

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, StoreError};

/// Stop sequence that ends generation at the boundary of the query text
pub const QUERY_STOP_SEQUENCE: &str = "\nSQLResult:";

/// One natural-language question to answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub question: String,
    /// Relations whose schema goes into the prompt (`None` = all relations)
    pub relation_names_to_use: Option<Vec<String>>,
}

impl QueryRequest {
    /// Create a request that considers every relation in the store
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            relation_names_to_use: None,
        }
    }

    /// Restrict the prompt schema to the given relations
    pub fn with_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relation_names_to_use = Some(relations.into_iter().map(Into::into).collect());
        self
    }
}

/// Everything the translator needs besides the question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationContext {
    /// Schema text for the relations in scope
    pub rendered_schema: String,
    /// Query dialect name, e.g. `sqlite`
    pub dialect_hint: String,
    /// Row-limit hint injected into the prompt
    pub result_limit: usize,
    /// Sequences that end generation
    pub stop_sequences: Vec<String>,
}

impl TranslationContext {
    /// Build a context using the default query stop sequence
    pub fn new(
        rendered_schema: impl Into<String>,
        dialect_hint: impl Into<String>,
        result_limit: usize,
    ) -> Self {
        Self {
            rendered_schema: rendered_schema.into(),
            dialect_hint: dialect_hint.into(),
            result_limit: result_limit.max(1),
            stop_sequences: vec![QUERY_STOP_SEQUENCE.to_string()],
        }
    }

    /// Cut generated text at the first stop sequence and trim it.
    ///
    /// Invokers are not required to honour stop sequences, so the chain
    /// applies them again on its side.
    pub fn truncate_at_stop<'a>(&self, generated: &'a str) -> &'a str {
        let end = self
            .stop_sequences
            .iter()
            .filter(|stop| !stop.is_empty())
            .filter_map(|stop| generated.find(stop.as_str()))
            .min()
            .unwrap_or(generated.len());
        generated[..end].trim()
    }
}

/// Result of exactly one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The store ran the query
    Success { result_text: String },
    /// The store rejected the query or failed
    Failure { error_kind: ErrorKind, message: String },
}

impl ExecutionOutcome {
    /// Text recorded as an intermediate step
    pub fn text(&self) -> &str {
        match self {
            ExecutionOutcome::Success { result_text } => result_text,
            ExecutionOutcome::Failure { message, .. } => message,
        }
    }

    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }
}

impl From<Result<String, StoreError>> for ExecutionOutcome {
    fn from(result: Result<String, StoreError>) -> Self {
        match result {
            Ok(result_text) => ExecutionOutcome::Success { result_text },
            Err(err) => ExecutionOutcome::Failure {
                error_kind: err.kind,
                message: err.message,
            },
        }
    }
}

/// Output of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResult {
    /// Final answer (natural language, or the raw result text)
    pub answer: String,
    /// Generated queries and execution outcomes, alternating, when tracing is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_steps: Option<Vec<String>>,
}
