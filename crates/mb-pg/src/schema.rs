use super::*;
use tokio_postgres::Client;

/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` to avoid runtime allocations and enable
/// compile-time string construction via `const_format::concatcp!`.
///
/// # Design
///
/// This trait contains no I/O operations; it purely describes table structure.
/// [`migrate`] applies it.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements, or `""` when the
    /// primary key is the only index.
    fn indices() -> &'static str;
}

/// Creates the table and its indices if they do not exist yet.
pub async fn migrate<T: Schema>(client: &Client) -> Result<(), PgErr> {
    log::info!("creating table ({})", T::name());
    client.batch_execute(T::creates()).await?;
    if !T::indices().is_empty() {
        log::info!("indexing table ({})", T::name());
        client.batch_execute(T::indices()).await?;
    }
    Ok(())
}
