//! Port abstraction for stores that run the user upsert procedure.
//!
//! The port separates connection acquisition ([`UserUpsertStore::begin`]) from
//! the procedure call and from the commit/rollback boundary, so the upsert
//! service owns the transactional decision while adapters own the driver.

use crate::domain::{ProcedureOutput, UserDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// The store could not be reached or the session was lost.
        Connection {
            /// Driver-provided detail.
            message: String,
        } =>
            "user store connection failed: {message}",
        /// The store rejected or failed to execute a statement.
        Query {
            /// Driver-provided detail.
            message: String,
        } =>
            "user store query failed: {message}",
        /// The configured statement or connect timeout elapsed.
        Timeout {
            /// Driver-provided detail.
            message: String,
        } =>
            "user store call timed out: {message}",
        /// A result-set column uses a type the decoder cannot represent.
        UnsupportedColumn {
            /// Name of the offending column.
            column: String,
            /// Database type name of the column.
            type_name: String,
        } =>
            "result column {column} has unsupported type {type_name}",
    }
}

/// Parameters marshalled into one procedure invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertCall {
    /// Identifier passed by value and returned through the output parameter.
    pub existing_id: Option<UserId>,
    /// Validated user fields.
    pub draft: UserDraft,
}

impl UpsertCall {
    /// Build a call for the given draft and optional existing identifier.
    #[must_use]
    pub const fn new(draft: UserDraft, existing_id: Option<UserId>) -> Self {
        Self { existing_id, draft }
    }
}

/// Store capable of opening a unit of work around the upsert procedure.
#[cfg_attr(test, mockall::automock(type UnitOfWork = MockUpsertUnitOfWork;))]
pub trait UserUpsertStore {
    /// Unit of work bound to one scoped connection.
    type UnitOfWork: UpsertUnitOfWork;

    /// Acquire a connection and begin a unit of work on it.
    fn begin(&self) -> Result<Self::UnitOfWork, UserStoreError>;
}

/// Transactional session holding one connection.
///
/// Exactly one of [`commit`](Self::commit) or [`rollback`](Self::rollback)
/// ends the unit of work. Implementations must roll back when dropped without
/// either, and release the connection in every case.
#[cfg_attr(test, mockall::automock)]
pub trait UpsertUnitOfWork {
    /// Invoke the procedure and collect the result sets it produced.
    fn call_upsert(&mut self, call: &UpsertCall) -> Result<ProcedureOutput, UserStoreError>;

    /// Make the procedure's effects durable.
    fn commit(&mut self) -> Result<(), UserStoreError>;

    /// Discard the procedure's effects.
    fn rollback(&mut self) -> Result<(), UserStoreError>;
}
