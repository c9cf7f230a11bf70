//! Mapping SQLite failures onto retry classifications

use nlsql_chain::{ErrorKind, StoreError};
use rusqlite::ErrorCode;

/// Decide whether a SQLite failure can be fixed by rewriting the query
///
/// Generic `SQLITE_ERROR` (syntax errors, unknown tables or columns), constraint
/// violations and type mismatches are recoverable. Anything that points at the
/// database file, the connection, or permissions is fatal.
pub fn classify(err: &rusqlite::Error) -> ErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => classify_code(failure.code),
        rusqlite::Error::InvalidPath(_) => ErrorKind::Fatal,
        _ => ErrorKind::Recoverable,
    }
}

fn classify_code(code: ErrorCode) -> ErrorKind {
    match code {
        ErrorCode::CannotOpen
        | ErrorCode::NotADatabase
        | ErrorCode::DatabaseCorrupt
        | ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::PermissionDenied
        | ErrorCode::ReadOnly
        | ErrorCode::SystemIoFailure
        | ErrorCode::OutOfMemory
        | ErrorCode::AuthorizationForStatementDenied
        | ErrorCode::DiskFull
        | ErrorCode::InternalMalfunction
        | ErrorCode::FileLockingProtocolFailed
        | ErrorCode::NoLargeFileSupport => ErrorKind::Fatal,
        _ => ErrorKind::Recoverable,
    }
}

/// Convert a SQLite failure into a classified store error
pub fn to_store_error(err: rusqlite::Error) -> StoreError {
    StoreError {
        kind: classify(&err),
        message: err.to_string(),
    }
}
