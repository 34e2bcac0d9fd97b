//! Classification of `postgres` driver errors into user store errors.

use postgres::error::SqlState;
use tracing::debug;

use crate::domain::ports::UserStoreError;

/// Render a `postgres` error with its SQLSTATE and server diagnostics.
///
/// The driver's `Display` output often collapses database errors to a bare
/// `db error`, hiding the message callers actually need.
#[must_use]
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {}: {}",
        db_error.code().code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }

    if let Some(where_) = db_error.where_() {
        summary.push_str("; where: ");
        summary.push_str(where_);
    }

    summary
}

/// Map a driver error onto the store error taxonomy.
///
/// Connection-class (`08`) and authorisation (`28`) SQLSTATEs, closed
/// sessions, and errors without a SQLSTATE (I/O, TLS, URL parsing) are
/// connection failures. `57014` is a timeout. Everything else is a query
/// failure.
#[must_use]
pub fn map_postgres_error(error: &postgres::Error) -> UserStoreError {
    let message = format_postgres_error(error);
    let mapped = if error.is_closed() {
        UserStoreError::connection(message)
    } else {
        match error.code() {
            Some(code) if *code == SqlState::QUERY_CANCELED => UserStoreError::timeout(message),
            Some(code) => classify_sqlstate(code.code(), message),
            None => UserStoreError::connection(message),
        }
    };
    debug!(
        kind = mapped.kind(),
        closed = error.is_closed(),
        error = %mapped,
        "postgres operation failed"
    );
    mapped
}

/// Whether `error` reports a cursor the procedure never opened.
///
/// Depending on the server, `34000` surfaces when the `FETCH` is described or
/// only once it executes, so callers check both steps.
#[must_use]
pub fn is_missing_cursor(error: &postgres::Error) -> bool {
    error.code().is_some_and(is_invalid_cursor_state)
}

fn is_invalid_cursor_state(code: &SqlState) -> bool {
    *code == SqlState::INVALID_CURSOR_NAME
}

fn classify_sqlstate(code: &str, message: String) -> UserStoreError {
    if code.starts_with("08") || code.starts_with("28") {
        UserStoreError::connection(message)
    } else {
        UserStoreError::query(message)
    }
}
