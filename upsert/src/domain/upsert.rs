//! Upsert outcome model and the pure decoder for procedure output.
//!
//! [`decode_procedure_output`] turns the two raw result sets into an
//! [`UpsertResult`] or the typed failure describing which expectation the
//! procedure violated. It never touches a connection.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::ports::UserStoreError;
use super::{ColumnValue, ProcedureOutput, Row, UserId, UserValidationError};

/// Column carrying the resolved identifier in the returned row.
pub const ID_COLUMN: &str = "Id";

/// Column names accepted for the action label, compared case-insensitively.
const ACTION_COLUMNS: [&str; 2] = ["Accion", "Action"];

/// Action reported by the procedure for the affected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertAction {
    /// A new row was created.
    Inserted,
    /// An existing row was modified.
    Updated,
    /// The procedure omitted the action or used an unrecognised label.
    Unknown,
}

impl UpsertAction {
    /// Interpret an action label as emitted by the procedure.
    ///
    /// # Examples
    /// ```
    /// use user_upsert::domain::UpsertAction;
    ///
    /// assert_eq!(UpsertAction::from_label(" inserted "), UpsertAction::Inserted);
    /// assert_eq!(UpsertAction::from_label("MERGED"), UpsertAction::Unknown);
    /// ```
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        let label = raw.trim();
        if label.eq_ignore_ascii_case("INSERTED") {
            Self::Inserted
        } else if label.eq_ignore_ascii_case("UPDATED") {
            Self::Updated
        } else {
            Self::Unknown
        }
    }

    /// Canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "INSERTED",
            Self::Updated => "UPDATED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful outcome of one upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResult {
    /// Identifier resolved by the procedure.
    pub final_id: UserId,
    /// Action the procedure reported.
    pub action: UpsertAction,
    /// Affected row keyed by column name, with [`ID_COLUMN`] set to `final_id`.
    pub row: Row,
}

impl UpsertResult {
    /// Split into the `(final_id, action, row)` tuple callers usually want.
    #[must_use]
    pub fn into_parts(self) -> (UserId, UpsertAction, Row) {
        (self.final_id, self.action, self.row)
    }
}

/// Failures surfaced by the upsert operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    /// Input was rejected before contacting the store.
    #[error("invalid user record: {0}")]
    Validation(#[from] UserValidationError),
    /// The store failed; nothing is retried.
    #[error(transparent)]
    Store(#[from] UserStoreError),
    /// The procedure produced no affected-row result set.
    #[error("upsert procedure returned no result set")]
    NoResult,
    /// The procedure produced no usable final identifier.
    #[error("upsert procedure did not return a final id")]
    MissingFinalId,
    /// An update resolved to a different identifier than the one supplied.
    #[error("upsert procedure returned id {returned} for requested id {requested}")]
    IdMismatch {
        /// Identifier supplied by the caller.
        requested: UserId,
        /// Identifier reported by the procedure.
        returned: UserId,
    },
}

impl UpsertError {
    /// Whether the procedure broke its response contract.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::NoResult | Self::MissingFinalId | Self::IdMismatch { .. }
        )
    }
}

/// Decode the procedure's result sets into an [`UpsertResult`].
///
/// `requested` is the identifier passed to the call; when present the decoded
/// id must match it.
///
/// # Examples
/// ```
/// use user_upsert::domain::{
///     decode_procedure_output, ColumnValue, ProcedureOutput, ResultSet, UpsertAction,
/// };
///
/// let affected = ResultSet::new(["Nombre", "Accion"])
///     .with_row([ColumnValue::from("Ana"), ColumnValue::from("INSERTED")]);
/// let final_id = ResultSet::new(["FinalId"]).with_row([ColumnValue::from(5_i64)]);
///
/// let result = decode_procedure_output(ProcedureOutput::new(affected, final_id), None)?;
/// assert_eq!(result.final_id.get(), 5);
/// assert_eq!(result.action, UpsertAction::Inserted);
/// # Ok::<(), user_upsert::domain::UpsertError>(())
/// ```
pub fn decode_procedure_output(
    output: ProcedureOutput,
    requested: Option<UserId>,
) -> Result<UpsertResult, UpsertError> {
    let ProcedureOutput {
        affected_row,
        final_id: final_id_set,
    } = output;

    let mut row = affected_row
        .and_then(|set| set.first_row())
        .ok_or(UpsertError::NoResult)?;

    let final_id = final_id_set
        .and_then(|set| set.first_value().and_then(ColumnValue::as_int))
        .map(UserId::new)
        .ok_or(UpsertError::MissingFinalId)?;

    if let Some(expected) = requested.filter(|id| *id != final_id) {
        return Err(UpsertError::IdMismatch {
            requested: expected,
            returned: final_id,
        });
    }

    let action = action_from_row(&row);
    row.insert(ID_COLUMN.to_owned(), ColumnValue::Int(final_id.get()));

    Ok(UpsertResult {
        final_id,
        action,
        row,
    })
}

fn action_from_row(row: &Row) -> UpsertAction {
    row.iter()
        .find(|(column, _)| {
            ACTION_COLUMNS
                .iter()
                .any(|name| column.eq_ignore_ascii_case(name))
        })
        .and_then(|(_, value)| value.as_text())
        .map_or(UpsertAction::Unknown, UpsertAction::from_label)
}

#[cfg(test)]
#[path = "upsert_tests.rs"]
mod tests;
