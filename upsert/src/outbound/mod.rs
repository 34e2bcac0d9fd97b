//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user store invoking the upsert
//!   procedure through the synchronous `postgres` client.
//!
//! Adapters are thin translators between driver rows and the domain's
//! result-set model. They contain no insert-versus-update logic.

pub mod persistence;
