//! Durable registry of outstanding refresh tokens.
//!
//! A refresh token is valid only while its id is present here. Entries are
//! written on issuance and removed by the background [`Whitelist::reap`] sweep
//! once they are older than the refresh-token lifetime.
mod memory;
pub use memory::*;

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
pub use postgres::*;

use super::*;
use mb_core::REAP_BATCH_SIZE;
use mb_core::REAP_INTERVAL;
use std::time::Duration;
use tokio::sync::watch;

#[async_trait::async_trait]
pub trait Whitelist: Send + Sync {
    /// Stores `token` under `id`, replacing any previous entry.
    async fn put(&self, id: &str, token: &Token) -> Result<(), StoreError>;
    async fn get(&self, id: &str) -> Result<Token, StoreError>;
    /// Atomically removes `old` and stores `token` under `id`.
    /// Fails with [`StoreError::NotFound`] if `old` is already gone.
    async fn rotate(&self, old: &str, id: &str, token: &Token) -> Result<(), StoreError>;
    /// Visits up to `batch` entries with keys after `cursor`, in key order,
    /// inside one transaction, deleting those older than `max_age`.
    ///
    /// Returns the last key visited, or `None` once the keyspace is exhausted.
    async fn sweep(
        &self,
        cursor: Option<String>,
        max_age: Duration,
        batch: usize,
    ) -> Result<Option<String>, StoreError>;
    /// Releases the store. Any running reaper fails on its next batch.
    async fn close(&self) -> Result<(), StoreError>;

    /// Sweeps the whole keyspace forever, one batch per [`REAP_INTERVAL`],
    /// wrapping around at the end. Returns `Ok` when `shutdown` fires (or its
    /// sender is dropped) and the first storage error otherwise.
    async fn reap(
        &self,
        max_age: Duration,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<(), StoreError> {
        log::info!("reaping whitelist entries older than {:?}", max_age);
        let mut cursor = None;
        loop {
            cursor = self.sweep(cursor, max_age, REAP_BATCH_SIZE).await?;
            tokio::select! {
                _ = tokio::time::sleep(REAP_INTERVAL) => {}
                _ = shutdown.changed() => {
                    log::info!("whitelist reaper stopping");
                    return Ok(());
                }
            }
        }
    }
}
