//! Domain types, decoding, and the upsert service.
//!
//! Purpose: keep the insert-or-update contract independent of any driver.
//! Adapters translate native result sets into [`ProcedureOutput`]; everything
//! from there to [`UpsertResult`] happens here.
//!
//! Public surface:
//! - [`UserDraft`] / [`UserId`]: validated input record and store identifier.
//! - [`ResultSet`] / [`ProcedureOutput`]: driver-neutral procedure output.
//! - [`decode_procedure_output`]: pure decoder for the two result sets.
//! - [`UserUpsertService`]: commit/rollback boundary around one call.

pub mod ports;
pub mod result_set;
pub mod upsert;
pub mod upsert_service;
pub mod user;

pub use self::result_set::{ColumnValue, ProcedureOutput, ResultSet, Row};
pub use self::upsert::{
    ID_COLUMN, UpsertAction, UpsertError, UpsertResult, decode_procedure_output,
};
pub use self::upsert_service::UserUpsertService;
pub use self::user::{UserDraft, UserId, UserValidationError};
