//! Upsert service driving the commit/rollback boundary.
//!
//! Each call opens one unit of work, lets the store run the procedure, decodes
//! the output, and then either commits or rolls back before returning.

use tracing::{debug, info, warn};

use crate::domain::ports::{UpsertCall, UpsertUnitOfWork, UserUpsertStore};
use crate::domain::{UpsertError, UpsertResult, UserDraft, UserId, decode_procedure_output};

/// Upsert operation bound to a store.
#[derive(Debug, Clone)]
pub struct UserUpsertService<S> {
    store: S,
}

impl<S> UserUpsertService<S> {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S> UserUpsertService<S>
where
    S: UserUpsertStore,
{
    /// Validate raw fields and upsert them.
    ///
    /// Validation failures are returned before any connection is opened.
    pub fn upsert(
        &self,
        name: &str,
        age: i32,
        email: &str,
        existing_id: Option<UserId>,
    ) -> Result<UpsertResult, UpsertError> {
        let draft = UserDraft::new(name, age, email)?;
        self.upsert_draft(draft, existing_id)
    }

    /// Insert (`existing_id` absent) or update (`existing_id` present) a user.
    ///
    /// The unit of work is committed only after both result sets decode
    /// successfully; every other exit rolls it back before returning.
    pub fn upsert_draft(
        &self,
        draft: UserDraft,
        existing_id: Option<UserId>,
    ) -> Result<UpsertResult, UpsertError> {
        let call = UpsertCall::new(draft, existing_id);
        let mut unit_of_work = self.store.begin()?;

        debug!(existing_id = ?call.existing_id, "calling upsert procedure");
        let decoded = unit_of_work
            .call_upsert(&call)
            .map_err(UpsertError::from)
            .and_then(|output| decode_procedure_output(output, call.existing_id));

        match decoded {
            Ok(result) => {
                unit_of_work.commit()?;
                info!(
                    final_id = %result.final_id,
                    action = %result.action,
                    "user upsert committed"
                );
                Ok(result)
            }
            Err(error) => {
                abort(&mut unit_of_work, &error);
                Err(error)
            }
        }
    }
}

fn abort<U: UpsertUnitOfWork>(unit_of_work: &mut U, cause: &UpsertError) {
    warn!(error = %cause, "rolling back user upsert");
    if let Err(rollback_error) = unit_of_work.rollback() {
        warn!(
            error = %rollback_error,
            cause = %cause,
            "rollback failed after upsert error"
        );
    }
}

#[cfg(test)]
#[path = "upsert_service_tests.rs"]
mod tests;
