// Answer a question against the configured database

use std::sync::Arc;

use nlsql_chain::{ChainResult, DataStore, LanguageModel, QueryChain, SequentialQueryChain};
use tracing::info;

use super::{open_database, Command};
use crate::{error::CliResult, output::OutputStyle, settings::Settings};

/// `nlsql ask`
pub struct AskCommand {
    question: String,
    sequential: bool,
    settings: Settings,
}

impl AskCommand {
    pub fn new(question: String, settings: Settings) -> Self {
        Self {
            question,
            sequential: false,
            settings,
        }
    }

    /// Let the model pick relevant tables before translating
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Run the chain with the given collaborators
    pub async fn answer(
        &self,
        llm: Arc<dyn LanguageModel>,
        store: Arc<dyn DataStore>,
    ) -> CliResult<ChainResult> {
        let config = self.settings.chain.clone();
        info!(sequential = self.sequential, "Answering question");

        let result = if self.sequential {
            SequentialQueryChain::from_llm(llm, store, config)?
                .run(&self.question)
                .await?
        } else {
            QueryChain::new(llm, store, config)?
                .run_question(&self.question)
                .await?
        };
        Ok(result)
    }

    /// Render the answer, preceded by the steps when they were recorded
    pub fn render(result: &ChainResult, style: &OutputStyle) -> String {
        let mut lines = Vec::new();

        if let Some(steps) = &result.intermediate_steps {
            for (i, step) in steps.iter().enumerate() {
                if i % 2 == 0 {
                    lines.push(format!("{} {}", style.label("SQLQuery:"), style.code(step)));
                } else {
                    lines.push(format!("{} {}", style.label("SQLResult:"), step));
                }
            }
            lines.push(format!("{} {}", style.label("Answer:"), result.answer));
        } else {
            lines.push(result.answer.clone());
        }

        lines.join("\n")
    }
}

#[async_trait::async_trait]
impl Command for AskCommand {
    async fn execute(&self) -> CliResult<()> {
        let llm = self.settings.provider.build()?;
        let store = Arc::new(open_database(&self.settings.database)?);

        let result = self.answer(llm, store).await?;
        println!("{}", Self::render(&result, &OutputStyle::default()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_answer_only() {
        let result = ChainResult {
            answer: "There are 42 orders.".to_string(),
            intermediate_steps: None,
        };
        assert_eq!(
            AskCommand::render(&result, &OutputStyle::plain()),
            "There are 42 orders."
        );
    }

    #[test]
    fn test_render_steps() {
        let result = ChainResult {
            answer: "1250.0".to_string(),
            intermediate_steps: Some(vec![
                "SELECT SUM(amount) FROM orders;".to_string(),
                "no such column: amount".to_string(),
                "SELECT SUM(total) FROM orders;".to_string(),
                "1250.0".to_string(),
            ]),
        };
        assert_eq!(
            AskCommand::render(&result, &OutputStyle::plain()),
            "SQLQuery: SELECT SUM(amount) FROM orders;\n\
             SQLResult: no such column: amount\n\
             SQLQuery: SELECT SUM(total) FROM orders;\n\
             SQLResult: 1250.0\n\
             Answer: 1250.0"
        );
    }
}
