pub mod injury_logs;
pub mod patch;
mod pool;

pub use pool::{create_pool, run_migrations};

/// `INSERT INTO {table} (c1, ..., cn) VALUES ($1, ..., $n) RETURNING id`.
///
/// Column names come from compile-time constants only.
pub fn insert_returning_id(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}
