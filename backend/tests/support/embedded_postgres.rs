//! Fresh, migrated databases on an embedded cluster.
//!
//! Databases are created with the `postgres` client so `CREATE DATABASE`
//! runs outside any Diesel transaction; the schema comes from the same
//! embedded migrations the server applies at startup.

use foodgram::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const MAINTENANCE_DATABASE: &str = "postgres";

/// Create an empty database on `cluster`, apply migrations, and return its
/// connection URL.
pub fn provision_database(cluster: &TestCluster) -> Result<String, String> {
    let connection = cluster.connection();
    let name = format!("foodgram_test_{}", Uuid::new_v4().simple());

    let mut admin = Client::connect(&connection.database_url(MAINTENANCE_DATABASE), NoTls)
        .map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;

    let url = connection.database_url(&name);
    run_pending_migrations(&url).map_err(|err| err.to_string())?;
    Ok(url)
}
