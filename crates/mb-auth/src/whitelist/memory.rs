use super::*;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// In-process whitelist over an ordered map.
///
/// Stores the same encoded records as the durable backend. The write lock is
/// the transaction: one per put, rotate, or sweep batch. Clones share state.
/// Contents are lost on exit, so this suits tests and single-node development.
#[derive(Clone, Default)]
pub struct MemoryWhitelist {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryWhitelist {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.data.read().len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
    fn open(&self) -> Result<(), StoreError> {
        match self.closed.load(Ordering::Acquire) {
            true => Err(StoreError::Closed),
            false => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Whitelist for MemoryWhitelist {
    async fn put(&self, id: &str, token: &Token) -> Result<(), StoreError> {
        self.open()?;
        let value = record::encode(token)?;
        self.data.write().insert(id.to_string(), value);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Token, StoreError> {
        self.open()?;
        self.data
            .read()
            .get(id)
            .ok_or(StoreError::NotFound)
            .and_then(|value| record::decode(value))
    }

    async fn rotate(&self, old: &str, id: &str, token: &Token) -> Result<(), StoreError> {
        self.open()?;
        let value = record::encode(token)?;
        let mut data = self.data.write();
        data.remove(old).ok_or(StoreError::NotFound)?;
        data.insert(id.to_string(), value);
        Ok(())
    }

    async fn sweep(
        &self,
        cursor: Option<String>,
        max_age: Duration,
        batch: usize,
    ) -> Result<Option<String>, StoreError> {
        self.open()?;
        let now = mb_core::now();
        let mut data = self.data.write();
        let start = match cursor {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let visited = data
            .range::<String, _>((start, Bound::Unbounded))
            .take(batch)
            .map(|(key, value)| Ok((key.clone(), record::stale(value, now, max_age)?)))
            .collect::<Result<Vec<(String, bool)>, StoreError>>()?;
        let mut reaped = 0;
        for (key, _) in visited.iter().filter(|(_, stale)| *stale) {
            data.remove(key);
            reaped += 1;
        }
        if reaped > 0 {
            log::debug!("reaped {} of {} whitelist entries", reaped, visited.len());
        }
        match visited.len() < batch {
            true => Ok(None),
            false => Ok(visited.last().map(|(key, _)| key.clone())),
        }
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
