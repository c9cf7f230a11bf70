//! Property-based tests: attempt bounds hold against a real SQLite store

use std::sync::Arc;

use nlsql_chain::{testing::ScriptedLanguageModel, ChainConfig, ChainError, ExecutionErrorKind, QueryChain};
use nlsql_sqlite::SqliteDatabase;
use proptest::prelude::*;

fn inventory() -> SqliteDatabase {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT, qty INTEGER);
         INSERT INTO items (name, qty) VALUES ('bolt', 40), ('nut', 2);",
    )
    .unwrap();
    SqliteDatabase::from_connection(conn).unwrap()
}

proptest! {
    // A query naming a missing column is retried exactly `max_tries` times.
    #[test]
    fn prop_missing_column_exhausts_every_attempt(max_tries in 1usize..8) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (result, calls) = rt.block_on(async {
            let llm = Arc::new(ScriptedLanguageModel::repeating("SELECT weight FROM items;"));
            let chain = QueryChain::new(
                llm.clone(),
                Arc::new(inventory()),
                ChainConfig::new().max_tries(max_tries),
            )
            .unwrap();
            (chain.run_question("Total weight?").await, llm.calls())
        });

        prop_assert_eq!(calls, max_tries);
        prop_assert_eq!(
            result,
            Err(ChainError::Execution {
                kind: ExecutionErrorKind::RetriesExhausted,
                message: "no such column: weight".to_string(),
                attempts: max_tries,
            })
        );
    }

    // A fix on attempt `k` succeeds and records 2 * k steps.
    #[test]
    fn prop_fix_on_attempt_k_records_every_step(max_tries in 1usize..6, fix_at in 1usize..6) {
        prop_assume!(fix_at <= max_tries);

        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = rt.block_on(async {
            let mut responses = vec!["SELECT weight FROM items;"; fix_at - 1];
            responses.push("SELECT SUM(qty) FROM items;");
            let llm = Arc::new(ScriptedLanguageModel::new(responses));
            let config = ChainConfig::new()
                .max_tries(max_tries)
                .return_raw_result(true)
                .return_intermediate_steps(true);
            let chain = QueryChain::new(llm, Arc::new(inventory()), config).unwrap();
            chain.run_question("Total quantity?").await
        });

        let result = result.unwrap();
        prop_assert_eq!(result.answer.as_str(), "42");
        let steps = result.intermediate_steps.unwrap();
        prop_assert_eq!(steps.len(), 2 * fix_at);
        prop_assert_eq!(steps.last().map(String::as_str), Some("42"));
    }
}
