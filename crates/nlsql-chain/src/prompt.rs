//! Prompt templates and transcript builders
//!
//! Templates use `{variable}` placeholders; `{{` and `}}` produce literal braces.
//! Placeholders are checked against the declared input variables when the
//! template is built, so rendering never fails.

use std::collections::HashMap;

use crate::error::PromptError;

/// Name of the built-in translation template
pub const QUERY_TEMPLATE_NAME: &str = "query";

/// Name of the built-in decider template
pub const DECIDER_TEMPLATE_NAME: &str = "decider";

const QUERY_TEMPLATE: &str = r#"Given an input question, first write a syntactically correct {dialect} query to run, then look at the result of the query and return the answer. Unless the question asks for a specific number of rows, limit the query to at most {top_k} results with a LIMIT clause. Order the results by a relevant column to surface the most interesting rows.

Never select every column of a table; select only the few columns the question needs.

Use only the column names you can see in the schema description below. Do not query columns that do not exist, and pay attention to which column belongs to which table.

Use the following format:

Question: "Question here"
SQLQuery: "SQL query to run"
SQLResult: "Result of the SQL query"
Answer: "Final answer here"

Only use the following tables:

{table_info}

Question: {input}"#;

const DECIDER_TEMPLATE: &str = r#"Given the input question below and a list of candidate tables, output a comma-separated list of the table names that may be needed to answer the question. Output only the table names.

Question: {query}

Table Names: {table_names}

Relevant Table Names:"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A named prompt template with declared input variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    template: String,
    input_variables: Vec<String>,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Build a template, checking every placeholder is a declared variable
    pub fn new<I, S>(
        name: impl Into<String>,
        template: impl Into<String>,
        input_variables: I,
    ) -> Result<Self, PromptError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let template = template.into();
        let input_variables: Vec<String> = input_variables.into_iter().map(Into::into).collect();
        let segments = parse_segments(&name, &template)?;

        for segment in &segments {
            if let Segment::Variable(variable) = segment {
                if !input_variables.contains(variable) {
                    return Err(PromptError::UndeclaredVariable {
                        template: name,
                        variable: variable.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            template,
            input_variables,
            segments,
        })
    }

    /// The built-in translation template (`input`, `dialect`, `top_k`, `table_info`)
    pub fn query() -> Self {
        Self::builtin(
            QUERY_TEMPLATE_NAME,
            QUERY_TEMPLATE,
            &["input", "dialect", "top_k", "table_info"],
        )
    }

    /// The built-in decider template (`query`, `table_names`)
    pub fn decider() -> Self {
        Self::builtin(DECIDER_TEMPLATE_NAME, DECIDER_TEMPLATE, &["query", "table_names"])
    }

    // Built-in templates are known to be well formed.
    fn builtin(name: &str, template: &str, variables: &[&str]) -> Self {
        let segments = match parse_segments(name, template) {
            Ok(segments) => segments,
            Err(_) => vec![Segment::Literal(template.to_string())],
        };
        Self {
            name: name.to_string(),
            template: template.to_string(),
            input_variables: variables.iter().map(|v| v.to_string()).collect(),
            segments,
        }
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared input variables
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Render with the given variables.
    ///
    /// Extra keys are ignored; declared variables without a value render empty.
    pub fn render(&self, variables: &HashMap<&str, String>) -> String {
        let mut output = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Variable(name) => {
                    if let Some(value) = variables.get(name.as_str()) {
                        output.push_str(value);
                    }
                }
            }
        }
        output
    }
}

fn parse_segments(name: &str, template: &str) -> Result<Vec<Segment>, PromptError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut variable = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    variable.push(next);
                }
                if !closed {
                    return Err(PromptError::UnterminatedPlaceholder {
                        template: name.to_string(),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(variable.trim().to_string()));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Transcript for the first translation: `"{question} \nSQLQuery:"`
pub fn translation_input(question: &str) -> String {
    format!("{} \nSQLQuery:", question)
}

/// Transcript asking the model to fix a query the store rejected
pub fn recovery_input(question: &str, failed_query: &str, error_message: &str) -> String {
    format!(
        "{}{}\nSQLError: {}\nThe query above failed. Write a corrected query that avoids this error.\nSQLQuery:",
        translation_input(question),
        failed_query,
        error_message
    )
}

/// Transcript asking the model for the final natural-language answer
pub fn answer_input(question: &str, query: &str, result: &str) -> String {
    format!(
        "{}{}\nSQLResult: {}\nAnswer:",
        translation_input(question),
        query,
        result
    )
}
