//! Two-stage chain: pick relevant relations, then run a [`QueryChain`] on them
//!
//! Stores with many relations produce schema text too large to put in every
//! prompt. The decider step narrows the schema before translation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    chain::QueryChain,
    config::ChainConfig,
    error::{ChainError, DeciderParseError, ExecutionErrorKind, Result},
    llm::LanguageModel,
    models::{ChainResult, QueryRequest},
    parser::parse_relation_list,
    prompt::PromptTemplate,
    store::DataStore,
};

/// Decider step followed by a restricted [`QueryChain`]
pub struct SequentialQueryChain {
    decider_llm: Arc<dyn LanguageModel>,
    decider_prompt: PromptTemplate,
    query_chain: QueryChain,
}

impl SequentialQueryChain {
    /// Combine a decider model with an existing query chain
    pub fn new(decider_llm: Arc<dyn LanguageModel>, query_chain: QueryChain) -> Self {
        Self {
            decider_llm,
            decider_prompt: PromptTemplate::decider(),
            query_chain,
        }
    }

    /// Build both stages on one model with the built-in prompts
    pub fn from_llm(
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn DataStore>,
        config: ChainConfig,
    ) -> Result<Self> {
        let query_chain = QueryChain::new(Arc::clone(&llm), store, config)?;
        Ok(Self::new(llm, query_chain))
    }

    /// Replace the translation prompt of the inner chain
    pub fn with_query_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.query_chain = self.query_chain.with_prompt(prompt);
        self
    }

    /// Replace the decider prompt (`query`, `table_names`)
    pub fn with_decider_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.decider_prompt = prompt;
        self
    }

    /// The inner query chain
    pub fn query_chain(&self) -> &QueryChain {
        &self.query_chain
    }

    /// Answer a question using only the relations the decider selects
    ///
    /// # Errors
    ///
    /// Everything [`QueryChain::run`] returns, plus
    /// [`ChainError::DeciderParse`] when the decider output is unusable.
    pub async fn run(&self, question: &str) -> Result<ChainResult> {
        let relations = self.decide_relations(question).await?;
        info!(relations = ?relations, "Relations selected for query");

        let request = QueryRequest::new(question).with_relations(relations);
        self.query_chain.run(request).await
    }

    /// Ask the decider which relations the question needs
    pub async fn decide_relations(&self, question: &str) -> Result<Vec<String>> {
        let store = self.query_chain.store();
        let all_relations = store.list_relation_names().await.map_err(|e| {
            error!(error = %e, "Listing relations failed");
            ChainError::execution(ExecutionErrorKind::Fatal, e.message, 0)
        })?;
        debug!(count = all_relations.len(), "Listed relations");

        let variables: HashMap<&str, String> = HashMap::from([
            ("query", question.to_string()),
            ("table_names", all_relations.join(", ")),
        ]);
        let prompt = self.decider_prompt.render(&variables);

        let output = self.decider_llm.generate(&prompt, &[]).await.map_err(|e| {
            error!(error = %e, "Decider call failed");
            ChainError::Translation(e)
        })?;
        debug!(output = %output.trim(), "Decider output");

        let selected = parse_relation_list(&output).map_err(|e| {
            error!(error = %e, "Decider output could not be parsed");
            ChainError::DeciderParse(e)
        })?;

        let unknown: Vec<String> = selected
            .iter()
            .filter(|name| !all_relations.contains(name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            error!(unknown = ?unknown, "Decider selected unknown relations");
            return Err(DeciderParseError::UnknownRelations(unknown).into());
        }

        Ok(selected)
    }
}
