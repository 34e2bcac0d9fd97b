//! Test utilities for the user upsert crate.
//!
//! [`InMemoryUserStore`] emulates the upsert procedure over an in-process
//! table, including scripted protocol faults, so unit and integration tests can
//! exercise the commit/rollback boundary without a live database. Identifiers
//! are drawn from a sequence that, like a database sequence, is not rewound by
//! rollbacks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::ports::{UpsertCall, UpsertUnitOfWork, UserStoreError, UserUpsertStore};
use crate::domain::{ColumnValue, ProcedureOutput, ResultSet, UpsertAction, UserId};

/// Action column name the emulated procedure uses by default.
pub const DEFAULT_ACTION_COLUMN: &str = "Accion";

/// Misbehaviour the emulated procedure should exhibit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcedureFault {
    /// Behave like a correct procedure.
    #[default]
    None,
    /// Mutate the table but return no result sets at all.
    NoResultSets,
    /// Return the affected row and an empty second result set.
    EmptyFinalId,
    /// Return the affected row and no second result set.
    MissingFinalIdSet,
    /// Fail to open a connection.
    ConnectionRefused,
}

/// A committed row in the emulated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// Identifier issued on insert.
    pub id: UserId,
    /// Stored name.
    pub name: String,
    /// Stored age.
    pub age: i32,
    /// Stored email.
    pub email: String,
}

#[derive(Debug)]
struct StoreState {
    users: BTreeMap<UserId, StoredUser>,
    next_id: i64,
    fault: ProcedureFault,
    action_column: Option<String>,
    calls: usize,
    commits: usize,
    rollbacks: usize,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
            fault: ProcedureFault::None,
            action_column: Some(DEFAULT_ACTION_COLUMN.to_owned()),
            calls: 0,
            commits: 0,
            rollbacks: 0,
        }
    }
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory user table with upsert-procedure semantics.
///
/// Clones share the same table, so a test can keep one handle for reads while
/// the service owns another.
///
/// # Examples
///
/// ```rust
/// use user_upsert::domain::{UpsertAction, UserUpsertService};
/// use user_upsert::test_support::InMemoryUserStore;
///
/// let store = InMemoryUserStore::new();
/// let service = UserUpsertService::new(store.clone());
///
/// let result = service.upsert("Ana", 31, "ana@example.com", None).unwrap();
/// assert_eq!(result.action, UpsertAction::Inserted);
/// assert_eq!(store.find(result.final_id).unwrap().name, "Ana");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryUserStore {
    /// Create an empty store behaving correctly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the fault subsequent calls exhibit.
    pub fn set_fault(&self, fault: ProcedureFault) {
        lock(&self.state).fault = fault;
    }

    /// Name the column carrying the action label, or omit it with `None`.
    pub fn set_action_column(&self, column: Option<&str>) {
        lock(&self.state).action_column = column.map(str::to_owned);
    }

    /// Read a committed row, bypassing any unit of work.
    #[must_use]
    pub fn find(&self, id: UserId) -> Option<StoredUser> {
        lock(&self.state).users.get(&id).cloned()
    }

    /// Number of committed rows.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).users.len()
    }

    /// Whether no rows are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).users.is_empty()
    }

    /// Number of procedure invocations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.state).calls
    }

    /// Number of committed units of work.
    #[must_use]
    pub fn commits(&self) -> usize {
        lock(&self.state).commits
    }

    /// Number of units of work rolled back, explicitly or on drop.
    #[must_use]
    pub fn rollbacks(&self) -> usize {
        lock(&self.state).rollbacks
    }
}

impl UserUpsertStore for InMemoryUserStore {
    type UnitOfWork = InMemoryUnitOfWork;

    fn begin(&self) -> Result<Self::UnitOfWork, UserStoreError> {
        if lock(&self.state).fault == ProcedureFault::ConnectionRefused {
            return Err(UserStoreError::connection("connection refused"));
        }
        Ok(InMemoryUnitOfWork {
            state: Arc::clone(&self.state),
            pending: None,
            finished: false,
        })
    }
}

/// Unit of work staging at most one row until commit.
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    state: Arc<Mutex<StoreState>>,
    pending: Option<StoredUser>,
    finished: bool,
}

impl InMemoryUnitOfWork {
    fn ensure_open(&self) -> Result<(), UserStoreError> {
        if self.finished {
            Err(UserStoreError::query("unit of work already finished"))
        } else {
            Ok(())
        }
    }
}

impl UpsertUnitOfWork for InMemoryUnitOfWork {
    fn call_upsert(&mut self, call: &UpsertCall) -> Result<ProcedureOutput, UserStoreError> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        state.calls += 1;

        let (id, action) = match call.existing_id {
            None => {
                let id = UserId::new(state.next_id);
                state.next_id += 1;
                (id, UpsertAction::Inserted)
            }
            Some(id) if state.users.contains_key(&id) => (id, UpsertAction::Updated),
            Some(id) => {
                return Err(UserStoreError::query(format!("user {id} does not exist")));
            }
        };

        let row = StoredUser {
            id,
            name: call.draft.name().to_owned(),
            age: call.draft.age(),
            email: call.draft.email().to_owned(),
        };
        let fault = state.fault;
        let action_column = state.action_column.clone();
        drop(state);

        let mut columns = vec!["Id", "Nombre", "Edad", "Email"];
        let mut values = vec![
            ColumnValue::from(row.id.get()),
            ColumnValue::from(row.name.as_str()),
            ColumnValue::from(row.age),
            ColumnValue::from(row.email.as_str()),
        ];
        if let Some(column) = action_column.as_deref() {
            columns.push(column);
            values.push(ColumnValue::from(action.as_str()));
        }
        let affected = ResultSet::new(columns).with_row(values);
        self.pending = Some(row);

        let final_id = ResultSet::new(["FinalId"]);
        Ok(match fault {
            ProcedureFault::NoResultSets => ProcedureOutput::empty(),
            ProcedureFault::EmptyFinalId => ProcedureOutput::new(affected, final_id),
            ProcedureFault::MissingFinalIdSet => ProcedureOutput {
                affected_row: Some(affected),
                final_id: None,
            },
            ProcedureFault::None | ProcedureFault::ConnectionRefused => {
                ProcedureOutput::new(affected, final_id.with_row([ColumnValue::from(id.get())]))
            }
        })
    }

    fn commit(&mut self) -> Result<(), UserStoreError> {
        self.ensure_open()?;
        self.finished = true;
        let mut state = lock(&self.state);
        if let Some(row) = self.pending.take() {
            state.users.insert(row.id, row);
        }
        state.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), UserStoreError> {
        self.ensure_open()?;
        self.finished = true;
        self.pending = None;
        lock(&self.state).rollbacks += 1;
        Ok(())
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        if !self.finished {
            lock(&self.state).rollbacks += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserDraft;
    use rstest::rstest;

    fn call(existing_id: Option<UserId>) -> UpsertCall {
        let draft = UserDraft::new("Ana", 31, "ana@example.com").expect("valid draft");
        UpsertCall::new(draft, existing_id)
    }

    #[rstest]
    fn rows_are_invisible_until_commit() {
        let store = InMemoryUserStore::new();
        let mut unit_of_work = store.begin().expect("begin");

        unit_of_work.call_upsert(&call(None)).expect("call");
        assert!(store.is_empty());

        unit_of_work.commit().expect("commit");
        assert_eq!(store.len(), 1);
        assert_eq!(store.commits(), 1);
    }

    #[rstest]
    fn dropping_an_open_unit_of_work_counts_as_rollback() {
        let store = InMemoryUserStore::new();
        {
            let mut unit_of_work = store.begin().expect("begin");
            unit_of_work.call_upsert(&call(None)).expect("call");
        }
        assert!(store.is_empty());
        assert_eq!(store.rollbacks(), 1);
    }

    #[rstest]
    fn finished_unit_of_work_rejects_further_calls() {
        let store = InMemoryUserStore::new();
        let mut unit_of_work = store.begin().expect("begin");
        unit_of_work.rollback().expect("rollback");

        let error = unit_of_work.commit().expect_err("second finish fails");
        assert_eq!(error, UserStoreError::query("unit of work already finished"));
        assert_eq!(store.rollbacks(), 1);
    }

    #[rstest]
    #[case(Some("Action"), Some("Action"))]
    #[case(None, None)]
    fn action_column_can_be_renamed_or_omitted(
        #[case] configured: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let store = InMemoryUserStore::new();
        store.set_action_column(configured);
        let mut unit_of_work = store.begin().expect("begin");

        let output = unit_of_work.call_upsert(&call(None)).expect("call");
        let row = output
            .affected_row
            .as_ref()
            .and_then(ResultSet::first_row)
            .expect("affected row");
        assert!(!row.contains_key(DEFAULT_ACTION_COLUMN));
        let action = ColumnValue::from("INSERTED");
        match expected {
            Some(column) => assert_eq!(row.get(column), Some(&action)),
            None => assert_eq!(row.len(), 4),
        }
    }

    #[rstest]
    fn updating_unknown_id_fails() {
        let store = InMemoryUserStore::new();
        let mut unit_of_work = store.begin().expect("begin");

        let error = unit_of_work
            .call_upsert(&call(Some(UserId::new(99))))
            .expect_err("unknown id");
        assert!(matches!(error, UserStoreError::Query { .. }));
    }

    #[rstest]
    fn sequence_is_not_rewound_by_rollback() {
        let store = InMemoryUserStore::new();
        let mut first = store.begin().expect("begin");
        first.call_upsert(&call(None)).expect("call");
        first.rollback().expect("rollback");

        let mut second = store.begin().expect("begin");
        let output = second.call_upsert(&call(None)).expect("call");
        let id = output
            .final_id
            .as_ref()
            .and_then(ResultSet::first_value)
            .and_then(ColumnValue::as_int);
        assert_eq!(id, Some(2));
    }
}
