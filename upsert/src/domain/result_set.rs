//! Driver-neutral model of the result sets produced by a procedure call.
//!
//! Adapters translate native rows into these types so the decoding step can be
//! exercised against fabricated data without a live store.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Scalar value carried by a result-set column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// SQL `NULL`.
    Null,
    /// Boolean column.
    Bool(bool),
    /// Any integer column, widened to 64 bits.
    Int(i64),
    /// Any floating point column, widened to 64 bits.
    Float(f64),
    /// Any textual column.
    Text(String),
}

impl ColumnValue {
    /// Return the integer payload, if this is an integer column.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Return the text payload, if this is a textual column.
    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Whether the value is SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T> From<Option<T>> for ColumnValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single row keyed by column name.
pub type Row = BTreeMap<String, ColumnValue>;

/// One result set: ordered column names plus positional row values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<ColumnValue>>,
}

impl ResultSet {
    /// Create an empty result set with the given column names.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of positional values.
    ///
    /// Missing trailing values are padded with `NULL`; extra values are
    /// dropped so every row matches the column list.
    #[must_use]
    pub fn with_row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = ColumnValue>,
    {
        self.push_row(values);
        self
    }

    /// Append a row of positional values in place.
    pub fn push_row<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = ColumnValue>,
    {
        let mut row: Vec<ColumnValue> = values.into_iter().take(self.columns.len()).collect();
        row.resize(self.columns.len(), ColumnValue::Null);
        self.rows.push(row);
    }

    /// Column names in result order.
    #[must_use]
    pub const fn columns(&self) -> &[String] {
        self.columns.as_slice()
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&ColumnValue> {
        self.rows.first().and_then(|row| row.first())
    }

    /// First row keyed by column name, if any.
    #[must_use]
    pub fn first_row(&self) -> Option<Row> {
        self.rows.first().map(|values| {
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect()
        })
    }
}

/// Result sets produced by one invocation of the upsert procedure.
///
/// `affected_row` is the first set the procedure emits and `final_id` the
/// second. `None` means the procedure did not produce that set at all, which is
/// distinct from producing it with zero rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureOutput {
    /// Result set 1: the affected row including the action column.
    pub affected_row: Option<ResultSet>,
    /// Result set 2: a single column holding the resolved identifier.
    pub final_id: Option<ResultSet>,
}

impl ProcedureOutput {
    /// Output with neither result set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            affected_row: None,
            final_id: None,
        }
    }

    /// Output carrying both result sets.
    #[must_use]
    pub const fn new(affected_row: ResultSet, final_id: ResultSet) -> Self {
        Self {
            affected_row: Some(affected_row),
            final_id: Some(final_id),
        }
    }
}
