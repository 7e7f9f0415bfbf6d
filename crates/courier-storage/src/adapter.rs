// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the HistoryStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use courier_config::model::StorageConfig;
use courier_core::{
    AdapterType, CourierError, DeliveryId, DeliveryRecord, HealthStatus, HistoryQuery,
    HistoryStore, PluginAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed delivery history.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened by [`SqliteHistory::initialize`].
pub struct SqliteHistory {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteHistory {
    /// The database is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, CourierError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    fn db(&self) -> Result<&Database, CourierError> {
        self.db.get().ok_or_else(|| CourierError::Storage {
            source: "history store not initialized -- call initialize() first".into(),
        })
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), CourierError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CourierError::Storage {
            source: "history store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite history initialized");
        Ok(())
    }

    /// Checkpoint the WAL. The connection closes when the store is dropped.
    pub async fn close(&self) -> Result<(), CourierError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteHistory {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    async fn append(&self, record: &DeliveryRecord) -> Result<(), CourierError> {
        queries::deliveries::insert_delivery(self.db()?, record).await
    }

    async fn recent(&self, query: &HistoryQuery) -> Result<Vec<DeliveryRecord>, CourierError> {
        queries::deliveries::recent_deliveries(self.db()?, query).await
    }

    async fn get(&self, id: &DeliveryId) -> Result<Option<DeliveryRecord>, CourierError> {
        queries::deliveries::get_delivery(self.db()?, id).await
    }
}
