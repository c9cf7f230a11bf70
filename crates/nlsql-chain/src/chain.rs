//! Single-stage query chain: translate, execute, recover, answer

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    config::ChainConfig,
    error::{ChainError, ExecutionErrorKind, LanguageModelError, Result},
    llm::LanguageModel,
    models::{ChainResult, ExecutionOutcome, QueryRequest, TranslationContext},
    prompt::{answer_input, recovery_input, translation_input, PromptTemplate},
    retry::{AttemptState, RetryPolicy},
    store::DataStore,
};

/// Turns one question into one query, runs it and answers from the result
///
/// A chain holds no per-run state; each [`run`](Self::run) is independent.
pub struct QueryChain {
    llm: Arc<dyn LanguageModel>,
    store: Arc<dyn DataStore>,
    prompt: PromptTemplate,
    config: ChainConfig,
    policy: RetryPolicy,
}

impl QueryChain {
    /// Create a chain using the built-in query prompt
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn DataStore>,
        config: ChainConfig,
    ) -> Result<Self> {
        config.validate()?;
        let policy = RetryPolicy::new(config.max_tries);

        Ok(Self {
            llm,
            store,
            prompt: PromptTemplate::query(),
            config,
            policy,
        })
    }

    /// Replace the translation prompt
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Chain configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Translation prompt in use
    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    /// Data store queried by this chain
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Answer a question against every relation in the store
    pub async fn run_question(&self, question: &str) -> Result<ChainResult> {
        self.run(QueryRequest::new(question)).await
    }

    /// Answer a question
    ///
    /// # Errors
    ///
    /// - [`ChainError::Translation`] when a language model call fails
    /// - [`ChainError::Execution`] with [`ExecutionErrorKind::Fatal`] when the
    ///   store is unusable, or [`ExecutionErrorKind::RetriesExhausted`] when
    ///   every allowed attempt was rejected
    pub async fn run(&self, request: QueryRequest) -> Result<ChainResult> {
        let relations = request.relation_names_to_use.as_deref();
        debug!(
            question = %request.question,
            relations = ?relations,
            "Fetching schema"
        );

        let schema = self.store.schema_text(relations).await.map_err(|e| {
            error!(error = %e, "Schema fetch failed");
            ChainError::execution(ExecutionErrorKind::Fatal, e.message, 0)
        })?;

        let context = TranslationContext::new(schema, self.store.dialect(), self.config.top_k);
        let mut steps: Vec<String> = Vec::new();

        let mut query = self
            .generate_query(&context, translation_input(&request.question))
            .await?;
        info!(query = %query, "Generated query");
        steps.push(query.clone());

        let mut state = AttemptState::Attempting { attempt: 1 };
        let result_text = loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    debug!(
                        attempt,
                        max_tries = self.policy.max_tries(),
                        "Executing query"
                    );
                    let outcome = ExecutionOutcome::from(self.store.execute(&query).await);
                    steps.push(outcome.text().to_string());
                    self.policy.transition(attempt, outcome)
                }
                AttemptState::Recoverable { attempt, message } => {
                    warn!(attempt, error = %message, "Query rejected, requesting a correction");
                    query = self
                        .generate_query(
                            &context,
                            recovery_input(&request.question, &query, &message),
                        )
                        .await?;
                    info!(query = %query, attempt = attempt + 1, "Generated corrected query");
                    steps.push(query.clone());
                    AttemptState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                AttemptState::Succeeded { result_text } => break result_text,
                AttemptState::Fatal { attempt, message } => {
                    error!(attempt, error = %message, "Store failure, aborting");
                    return Err(ChainError::execution(
                        ExecutionErrorKind::Fatal,
                        message,
                        attempt,
                    ));
                }
                AttemptState::Exhausted { attempt, message } => {
                    error!(attempt, error = %message, "Retries exhausted");
                    return Err(ChainError::execution(
                        ExecutionErrorKind::RetriesExhausted,
                        message,
                        attempt,
                    ));
                }
            };
        };
        debug!(result = %result_text, "Query succeeded");

        let answer = if self.config.return_raw_result {
            result_text
        } else {
            let answer = self
                .predict(
                    &context,
                    answer_input(&request.question, &query, &result_text),
                )
                .await?;
            debug!(answer = %answer, "Generated answer");
            answer
        };

        Ok(ChainResult {
            answer,
            intermediate_steps: self.config.return_intermediate_steps.then_some(steps),
        })
    }

    /// Generate a query; blank output never reaches the store
    async fn generate_query(&self, context: &TranslationContext, input: String) -> Result<String> {
        let query = self.predict(context, input).await?;
        if query.is_empty() {
            error!("Language model returned an empty query");
            return Err(ChainError::Translation(LanguageModelError::new(
                "language model returned an empty query",
            )));
        }
        Ok(query)
    }

    async fn predict(&self, context: &TranslationContext, input: String) -> Result<String> {
        let variables: HashMap<&str, String> = HashMap::from([
            ("input", input),
            ("dialect", context.dialect_hint.clone()),
            ("top_k", context.result_limit.to_string()),
            ("table_info", context.rendered_schema.clone()),
        ]);
        let prompt = self.prompt.render(&variables);

        let generated = self
            .llm
            .generate(&prompt, &context.stop_sequences)
            .await
            .map_err(|e| {
                error!(error = %e, "Language model call failed");
                ChainError::Translation(e)
            })?;

        Ok(context.truncate_at_stop(&generated).to_string())
    }
}
