//! End-to-end tests: a mocked Ollama server driving a chain over SQLite

use std::sync::Arc;

use mockito::Matcher;
use nlsql_chain::{ChainConfig, ChainError, QueryChain};
use nlsql_providers::{ProviderKind, ProviderSettings};
use nlsql_sqlite::SqliteDatabase;
use serde_json::json;

fn empty_database() -> Arc<SqliteDatabase> {
    Arc::new(SqliteDatabase::open_in_memory().unwrap())
}

fn ollama_settings(base_url: String) -> ProviderSettings {
    ProviderSettings {
        kind: ProviderKind::Ollama,
        model: "mistral".to_string(),
        base_url: Some(base_url),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_question_answered_through_ollama() {
    let mut server = mockito::Server::new_async().await;

    let translate = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"SQLQuery:","#.to_string()),
            Matcher::PartialJson(json!({"options": {"stop": ["\nSQLResult:"]}})),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "SELECT 6 * 7;\nSQLResult: 41", "done": true}"#)
        .create_async()
        .await;

    let answer = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Regex(r#"SQLResult: 42\\nAnswer:","#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": " The answer is 42.", "done": true}"#)
        .create_async()
        .await;

    let llm = ollama_settings(server.url()).build().unwrap();
    let chain = QueryChain::new(llm, empty_database(), ChainConfig::new().return_intermediate_steps(true)).unwrap();
    let result = chain.run_question("What is six times seven?").await.unwrap();

    assert_eq!(result.answer, "The answer is 42.");
    assert_eq!(
        result.intermediate_steps,
        Some(vec!["SELECT 6 * 7;".to_string(), "42".to_string()])
    );
    translate.assert_async().await;
    answer.assert_async().await;
}

#[tokio::test]
async fn test_provider_failure_is_translation_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error": "model 'mistral' not found"}"#)
        .create_async()
        .await;

    let llm = ollama_settings(server.url()).build().unwrap();
    let chain = QueryChain::new(llm, empty_database(), ChainConfig::default()).unwrap();
    let err = chain.run_question("What is six times seven?").await.unwrap_err();

    assert!(matches!(err, ChainError::Translation(e) if e.message.contains("404")));
}
