// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History store trait for delivery audit persistence.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::record::DeliveryRecord;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DeliveryId, HistoryQuery};

/// Append-only store of sealed delivery records.
///
/// Implementations must make each `append` atomic and must tolerate appends
/// arriving out of timestamp order; `recent` orders by each record's own
/// `created_at`, newest first.
#[async_trait]
pub trait HistoryStore: PluginAdapter {
    /// Persist one sealed record.
    async fn append(&self, record: &DeliveryRecord) -> Result<(), CourierError>;

    /// Most recent records first, optionally for one recipient.
    async fn recent(&self, query: &HistoryQuery) -> Result<Vec<DeliveryRecord>, CourierError>;

    /// Look up one record by id.
    async fn get(&self, id: &DeliveryId) -> Result<Option<DeliveryRecord>, CourierError>;
}
