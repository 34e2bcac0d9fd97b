//! Domain ports implemented by outbound adapters.

mod macros;

mod user_upsert_store;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use user_upsert_store::{MockUpsertUnitOfWork, MockUserUpsertStore};
pub use user_upsert_store::{UpsertCall, UpsertUnitOfWork, UserStoreError, UserUpsertStore};
