use super::*;
use mb_pg::*;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_postgres::Client;

/// Postgres-backed whitelist.
///
/// Requests share one connection. The reaper runs its batch transactions on a
/// second, dedicated connection so they never interleave with request traffic.
pub struct PgWhitelist {
    client: Client,
    sweeper: tokio::sync::Mutex<Client>,
    connections: Mutex<Vec<JoinHandle<()>>>,
}

impl PgWhitelist {
    /// Connects twice to `url` and creates the whitelist table if needed.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let (client, requests) = mb_pg::connect(url).await?;
        let (sweeper, reaper) = mb_pg::connect(url).await?;
        mb_pg::migrate::<Self>(&client).await?;
        Ok(Self {
            client,
            sweeper: tokio::sync::Mutex::new(sweeper),
            connections: Mutex::new(vec![requests, reaper]),
        })
    }
}

#[async_trait::async_trait]
impl Whitelist for PgWhitelist {
    async fn put(&self, id: &str, token: &Token) -> Result<(), StoreError> {
        let value = record::encode(token)?;
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    WHITELIST,
                    " (id, value) VALUES ($1, $2)
                     ON CONFLICT (id) DO UPDATE SET value = EXCLUDED.value"
                ),
                &[&id, &value],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Token, StoreError> {
        self.client
            .query_opt(
                const_format::concatcp!("SELECT value FROM ", WHITELIST, " WHERE id = $1"),
                &[&id],
            )
            .await?
            .ok_or(StoreError::NotFound)
            .and_then(|row| record::decode(&row.get::<_, Vec<u8>>(0)))
    }

    async fn rotate(&self, old: &str, id: &str, token: &Token) -> Result<(), StoreError> {
        let value = record::encode(token)?;
        let inserted = self
            .client
            .execute(
                const_format::concatcp!(
                    "WITH gone AS (DELETE FROM ",
                    WHITELIST,
                    " WHERE id = $1 RETURNING id)
                     INSERT INTO ",
                    WHITELIST,
                    " (id, value) SELECT $2, $3 FROM gone"
                ),
                &[&old, &id, &value],
            )
            .await?;
        match inserted {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn sweep(
        &self,
        cursor: Option<String>,
        max_age: Duration,
        batch: usize,
    ) -> Result<Option<String>, StoreError> {
        let mut sweeper = self.sweeper.lock().await;
        let tx = sweeper.transaction().await?;
        let rows = tx
            .query(
                const_format::concatcp!(
                    "SELECT id, substring(value FROM 1 FOR 8) FROM ",
                    WHITELIST,
                    " WHERE ($1::TEXT IS NULL OR id > $1)
                     ORDER BY id
                     LIMIT $2
                     FOR UPDATE"
                ),
                &[&cursor, &(batch as i64)],
            )
            .await?;
        let now = mb_core::now();
        let mut doomed = Vec::new();
        for row in rows.iter() {
            if record::stale(&row.get::<_, Vec<u8>>(1), now, max_age)? {
                doomed.push(row.get::<_, String>(0));
            }
        }
        if !doomed.is_empty() {
            tx.execute(
                const_format::concatcp!("DELETE FROM ", WHITELIST, " WHERE id = ANY($1)"),
                &[&doomed],
            )
            .await?;
            log::debug!("reaped {} of {} whitelist entries", doomed.len(), rows.len());
        }
        tx.commit().await?;
        match rows.len() < batch {
            true => Ok(None),
            false => Ok(rows.last().map(|row| row.get::<_, String>(0))),
        }
    }

    async fn close(&self) -> Result<(), StoreError> {
        log::info!("closing whitelist connections");
        self.connections
            .lock()
            .drain(..)
            .for_each(|handle| handle.abort());
        Ok(())
    }
}

impl Schema for PgWhitelist {
    fn name() -> &'static str {
        WHITELIST
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            WHITELIST,
            " (
                id          TEXT PRIMARY KEY,
                value       BYTEA NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}
