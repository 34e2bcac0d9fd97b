//! Shared helpers for the embedded PostgreSQL integration tests.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

pub use user_upsert::outbound::persistence::format_postgres_error;

/// Schema and procedures installed into every provisioned database.
pub const FIXTURE_SQL: &str = include_str!("../fixtures/usuarios.sql");

/// Returns true when the embedded cluster tests were explicitly requested.
pub fn embedded_postgres_enabled() -> bool {
    std::env::var("RUN_PG_EMBEDDED").as_deref() == Ok("1")
}

/// Returns true when `SKIP_TEST_CLUSTER` is set to a truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a cluster setup failure, skipping only when `SKIP_TEST_CLUSTER` is set.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Create a uniquely named database with the fixture schema installed.
///
/// Returns the connection URL of the new database.
pub fn provision_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("usuarios_{}", Uuid::new_v4().simple());
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;

    let url = cluster.connection().database_url(&name);
    let mut client = Client::connect(&url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(FIXTURE_SQL)
        .map_err(|err| format_postgres_error(&err))?;
    Ok(url)
}

/// Count the committed rows in `usuarios`.
pub fn count_users(url: &str) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one("SELECT COUNT(*) FROM usuarios", &[])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
