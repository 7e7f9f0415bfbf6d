// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory history stores.

use async_trait::async_trait;
use tokio::sync::Mutex;

use courier_core::{
    AdapterType, CourierError, DeliveryId, DeliveryRecord, HealthStatus, HistoryQuery,
    HistoryStore, PluginAdapter,
};

/// History kept in a `Vec`, ordered the same way as the SQLite store.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<DeliveryRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far, in append order.
    pub async fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for MemoryHistory {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, record: &DeliveryRecord) -> Result<(), CourierError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(CourierError::Storage {
                source: format!("duplicate delivery id {}", record.id).into(),
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn recent(&self, query: &HistoryQuery) -> Result<Vec<DeliveryRecord>, CourierError> {
        let mut matching: Vec<DeliveryRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| query.recipient.as_ref().is_none_or(|want| &r.recipient == want))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn get(&self, id: &DeliveryId) -> Result<Option<DeliveryRecord>, CourierError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }
}

/// A history store whose every operation fails, for audit-failure paths.
#[derive(Default)]
pub struct FailingHistory;

impl FailingHistory {
    fn error() -> CourierError {
        CourierError::Storage {
            source: "history unavailable".into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for FailingHistory {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Unhealthy("history unavailable".to_string()))
    }
}

#[async_trait]
impl HistoryStore for FailingHistory {
    async fn append(&self, _record: &DeliveryRecord) -> Result<(), CourierError> {
        Err(Self::error())
    }

    async fn recent(&self, _query: &HistoryQuery) -> Result<Vec<DeliveryRecord>, CourierError> {
        Err(Self::error())
    }

    async fn get(&self, _id: &DeliveryId) -> Result<Option<DeliveryRecord>, CourierError> {
        Err(Self::error())
    }
}
