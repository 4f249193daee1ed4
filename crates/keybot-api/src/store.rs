use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use keybot_db::Database;
use keybot_types::models::KeyRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("storage timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// The only gateway to persisted keys. Saving always appends.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert one record, returning the number of rows written.
    async fn save(&self, record: KeyRecord) -> Result<usize, StoreError>;
}

pub struct SqliteKeyStore {
    db: Arc<Database>,
}

impl SqliteKeyStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn save(&self, record: KeyRecord) -> Result<usize, StoreError> {
        // Run blocking DB insert off the async runtime
        let db = self.db.clone();
        let rows = tokio::task::spawn_blocking(move || db.insert_key(&record)).await??;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn each_save_adds_exactly_one_row() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store = SqliteKeyStore::new(db.clone());
        let record = KeyRecord {
            user_id: 42,
            key_type: "rsa".into(),
            key_text: "ssh-rsa AAAA".into(),
        };

        for expected in 1..=3 {
            assert_eq!(store.save(record.clone()).await.unwrap(), 1);
            assert_eq!(db.count_keys(42).unwrap(), expected);
        }
    }
}
