//! PostgreSQL integration for monban.
//!
//! ## Connectivity
//!
//! - [`connect()`] - Opens a connection and drives it on a background task
//!
//! ## Schema
//!
//! - [`Schema`] - Table metadata and DDL generation
//! - [`migrate()`] - Applies a [`Schema`] to a live database
//!
//! ## Table Names
//!
//! Constants for every table the service owns.
mod schema;

pub use schema::*;

use tokio::task::JoinHandle;
use tokio_postgres::Client;

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Establishes a database connection.
///
/// The connection future is spawned onto the runtime; the returned handle
/// owns it. Aborting the handle closes the connection, after which every
/// query on the client fails immediately.
pub async fn connect(url: &str) -> Result<(Client, JoinHandle<()>), PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    let handle = tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok((client, handle))
}

/// Table for registered user accounts.
#[rustfmt::skip]
pub const USERS:     &str = "users";
/// Table for outstanding refresh tokens.
#[rustfmt::skip]
pub const WHITELIST: &str = "whitelist";
