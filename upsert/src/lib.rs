//! Insert-or-update of user records through a stored procedure.
//!
//! The crate opens a unit of work and invokes the upsert procedure. It then
//! decodes the two result sets the procedure returns (the affected row, then
//! the resolved identifier) and commits only when both are present.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::StoreSettings;
pub use domain::{UpsertAction, UpsertError, UpsertResult, UserId, UserUpsertService};
