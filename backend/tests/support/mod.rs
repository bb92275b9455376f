//! Shared helpers for the embedded PostgreSQL integration suites.

pub mod cluster_skip;
pub mod embedded_postgres;
pub mod pg_embed;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::provision_database;
pub use pg_embed::test_cluster;

/// Render a `postgres` error with its SQLSTATE, detail and hint; the
/// `Display` form collapses to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    for (label, part) in [("detail", db_error.detail()), ("hint", db_error.hint())] {
        if let Some(text) = part {
            summary.push_str(&format!("; {label}: {text}"));
        }
    }
    summary
}
