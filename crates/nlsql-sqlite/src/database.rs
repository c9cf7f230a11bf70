//! SQLite-backed data store

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use nlsql_chain::{DataStore, StoreError};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    classify::to_store_error,
    format::{format_sample_value, format_value, quote_identifier, COLUMN_SEPARATOR},
};

/// Which tables are visible to the chain and how they are described
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    /// Only these tables are visible (mutually exclusive with `ignore_tables`)
    pub include_tables: Option<Vec<String>>,
    /// These tables are hidden
    pub ignore_tables: Option<Vec<String>>,
    /// Sample rows appended to each table's schema text
    pub sample_rows_in_table_info: usize,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            include_tables: None,
            ignore_tables: None,
            sample_rows_in_table_info: 3,
        }
    }
}

/// SQLite database exposed as a [`DataStore`]
///
/// All blocking calls run on the tokio blocking pool. The connection is shared
/// behind a mutex, so statements never interleave.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
    options: SqliteOptions,
}

impl SqliteDatabase {
    /// Open an existing database file
    ///
    /// A missing, unreadable or non-SQLite file is a fatal error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening SQLite database");

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            StoreError::fatal(format!("cannot open database {}: {}", path.display(), e))
        })?;

        Self::from_connection(conn)
    }

    /// Create an empty in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(to_store_error)?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        // Opening is lazy in SQLite; touch the schema so a bad file fails here
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| StoreError::fatal(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            options: SqliteOptions::default(),
        })
    }

    /// Apply table filters and sampling options
    pub fn with_options(mut self, options: SqliteOptions) -> Result<Self, StoreError> {
        if options.include_tables.is_some() && options.ignore_tables.is_some() {
            return Err(StoreError::fatal(
                "include_tables and ignore_tables are mutually exclusive",
            ));
        }

        let all_tables = all_table_names(&self.conn.lock()).map_err(to_store_error)?;
        let requested = options
            .include_tables
            .iter()
            .chain(options.ignore_tables.iter())
            .flatten();
        let missing: Vec<&str> = requested
            .filter(|name| !all_tables.contains(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::fatal(format!(
                "tables {} not found in database",
                missing.join(", ")
            )));
        }

        self.options = options;
        Ok(self)
    }

    /// Only expose the given tables
    pub fn include_tables<I, S>(self, tables: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = SqliteOptions {
            include_tables: Some(tables.into_iter().map(Into::into).collect()),
            ..self.options.clone()
        };
        self.with_options(options)
    }

    /// Hide the given tables
    pub fn ignore_tables<I, S>(self, tables: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = SqliteOptions {
            ignore_tables: Some(tables.into_iter().map(Into::into).collect()),
            ..self.options.clone()
        };
        self.with_options(options)
    }

    /// Set the number of sample rows shown per table
    pub fn sample_rows_in_table_info(mut self, rows: usize) -> Self {
        self.options.sample_rows_in_table_info = rows;
        self
    }

    /// Current options
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &SqliteOptions) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || f(&conn.lock(), &options))
            .await
            .map_err(|e| StoreError::fatal(format!("database task failed: {}", e)))?
    }
}

/// Every user table, sorted by name
fn all_table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// Tables left after applying include/ignore filters
fn usable_table_names(
    conn: &Connection,
    options: &SqliteOptions,
) -> rusqlite::Result<Vec<String>> {
    let mut names = all_table_names(conn)?;
    if let Some(include) = &options.include_tables {
        names.retain(|name| include.contains(name));
    }
    if let Some(ignore) = &options.ignore_tables {
        names.retain(|name| !ignore.contains(name));
    }
    Ok(names)
}

/// `CREATE` statement plus sample rows for one table
fn table_info(conn: &Connection, table: &str, sample_rows: usize) -> rusqlite::Result<String> {
    let create: String = conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;

    let mut info = create.trim().to_string();
    if sample_rows == 0 {
        return Ok(info);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} LIMIT {}",
        quote_identifier(table),
        sample_rows
    ))?;
    let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = headers.len();

    let mut lines = vec![headers.join("\t")];
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let values = (0..column_count)
            .map(|i| row.get_ref(i).map(format_sample_value))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        lines.push(values.join("\t"));
    }

    info.push_str(&format!(
        "\n\n/*\n{} rows from {} table:\n{}\n*/",
        sample_rows,
        table,
        lines.join("\n")
    ));
    Ok(info)
}

/// Execute a statement and render its rows
fn run_query(conn: &Connection, query: &str) -> rusqlite::Result<String> {
    let mut stmt = conn.prepare(query)?;
    let column_count = stmt.column_count();

    let mut lines = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let values = (0..column_count)
            .map(|i| row.get_ref(i).map(format_value))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        lines.push(values.join(COLUMN_SEPARATOR));
    }

    Ok(lines.join("\n"))
}

#[async_trait]
impl DataStore for SqliteDatabase {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    async fn list_relation_names(&self) -> Result<Vec<String>, StoreError> {
        self.with_connection(|conn, options| {
            usable_table_names(conn, options).map_err(to_store_error)
        })
        .await
    }

    async fn schema_text(&self, relation_names: Option<&[String]>) -> Result<String, StoreError> {
        let requested = relation_names.map(<[String]>::to_vec);

        self.with_connection(move |conn, options| {
            let usable = usable_table_names(conn, options).map_err(to_store_error)?;

            let tables = match requested {
                Some(requested) => {
                    let unknown: Vec<&str> = requested
                        .iter()
                        .filter(|name| !usable.contains(name))
                        .map(String::as_str)
                        .collect();
                    if !unknown.is_empty() {
                        return Err(StoreError::recoverable(format!(
                            "table names {} not found in database",
                            unknown.join(", ")
                        )));
                    }
                    usable
                        .into_iter()
                        .filter(|name| requested.contains(name))
                        .collect()
                }
                None => usable,
            };

            debug!(tables = tables.len(), "Rendering SQLite schema");
            let infos = tables
                .iter()
                .map(|table| table_info(conn, table, options.sample_rows_in_table_info))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(to_store_error)?;

            Ok(infos.join("\n\n"))
        })
        .await
    }

    async fn execute(&self, query: &str) -> Result<String, StoreError> {
        let query = query.trim().to_string();

        self.with_connection(move |conn, _| {
            debug!(query = %query, "Executing SQLite query");
            run_query(conn, &query).map_err(|e| {
                let err = to_store_error(e);
                warn!(kind = %err.kind, error = %err.message, "SQLite query failed");
                err
            })
        })
        .await
    }
}
