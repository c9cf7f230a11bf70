//! Scripted collaborators for tests
//!
//! Both doubles replay a queue of canned responses and record every call so
//! tests can assert invocation counts and arguments.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::{LanguageModelError, StoreError},
    llm::LanguageModel,
    store::DataStore,
};

/// Language model that returns queued responses in order
#[derive(Default)]
pub struct ScriptedLanguageModel {
    responses: Mutex<VecDeque<Result<String, LanguageModelError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLanguageModel {
    /// Create a model replaying `responses`, then failing
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a model that returns the same text forever
    pub fn repeating(response: impl Into<String>) -> Self {
        Self {
            fallback: Some(response.into()),
            ..Self::default()
        }
    }

    /// Queue a successful response
    pub fn then(self, response: impl Into<String>) -> Self {
        self.responses.lock().push_back(Ok(response.into()));
        self
    }

    /// Queue a failure
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .push_back(Err(LanguageModelError::new(message)));
        self
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn generate(&self, prompt: &str, _stop: &[String]) -> Result<String, LanguageModelError> {
        self.prompts.lock().push(prompt.to_string());

        if let Some(response) = self.responses.lock().pop_front() {
            return response;
        }

        self.fallback
            .clone()
            .ok_or_else(|| LanguageModelError::new("no scripted response left"))
    }
}

/// Data store with fixed relations and queued execution results
pub struct ScriptedStore {
    dialect: String,
    relations: BTreeMap<String, String>,
    results: Mutex<VecDeque<Result<String, StoreError>>>,
    fallback: Option<Result<String, StoreError>>,
    schema_requests: Mutex<Vec<Option<Vec<String>>>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedStore {
    /// Create an empty `sqlite` store
    pub fn new() -> Self {
        Self {
            dialect: "sqlite".to_string(),
            relations: BTreeMap::new(),
            results: Mutex::new(VecDeque::new()),
            fallback: None,
            schema_requests: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Add a relation with its schema text
    pub fn with_relation(mut self, name: impl Into<String>, schema: impl Into<String>) -> Self {
        self.relations.insert(name.into(), schema.into());
        self
    }

    /// Queue an execution result
    pub fn then(self, result: Result<String, StoreError>) -> Self {
        self.results.lock().push_back(result);
        self
    }

    /// Result returned once the queue is empty
    pub fn always(mut self, result: Result<String, StoreError>) -> Self {
        self.fallback = Some(result);
        self
    }

    /// Arguments of every `schema_text` call
    pub fn schema_requests(&self) -> Vec<Option<Vec<String>>> {
        self.schema_requests.lock().clone()
    }

    /// Every query executed, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for ScriptedStore {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    async fn list_relation_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.relations.keys().cloned().collect())
    }

    async fn schema_text(&self, relation_names: Option<&[String]>) -> Result<String, StoreError> {
        self.schema_requests
            .lock()
            .push(relation_names.map(<[String]>::to_vec));

        match relation_names {
            None => Ok(self
                .relations
                .values()
                .cloned()
                .collect::<Vec<_>>()
                .join("\n\n")),
            Some(names) => {
                let mut parts = Vec::with_capacity(names.len());
                for name in names {
                    match self.relations.get(name) {
                        Some(schema) => parts.push(schema.clone()),
                        None => {
                            return Err(StoreError::recoverable(format!("no such table: {}", name)))
                        }
                    }
                }
                Ok(parts.join("\n\n"))
            }
        }
    }

    async fn execute(&self, query: &str) -> Result<String, StoreError> {
        self.executed.lock().push(query.to_string());

        if let Some(result) = self.results.lock().pop_front() {
            return result;
        }

        self.fallback
            .clone()
            .unwrap_or_else(|| Err(StoreError::fatal("no scripted result left")))
    }
}
