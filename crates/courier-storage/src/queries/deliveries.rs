// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery record persistence: atomic append, recency listing, lookup by id.

use courier_core::{
    ChannelAttempt, CourierError, DeliveryId, DeliveryRecord, HistoryQuery, NormalizedRecipient,
    TransportError, ValidationResult,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};
use crate::models::{decode_enum, decode_ts, encode_ts};

const RECORD_COLUMNS: &str =
    "id, recipient, body, category, final_channel, final_outcome, created_at, sealed_at";

/// Insert a sealed record and all of its attempts in one transaction.
pub async fn insert_delivery(db: &Database, record: &DeliveryRecord) -> Result<(), CourierError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO delivery_records
                 (id, recipient, body, category, final_channel, final_outcome, created_at, sealed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id.as_str(),
                    record.recipient.as_str(),
                    record.body,
                    record.category.to_string(),
                    record.final_channel.map(|c| c.to_string()),
                    record.final_outcome.to_string(),
                    encode_ts(&record.created_at),
                    encode_ts(&record.sealed_at),
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO delivery_attempts
                     (record_id, seq, channel, outcome, provider_identifier, failure_kind,
                      failure_detail, identifier_valid, identifier_reason, identifier_detail,
                      attempted_at, completed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )?;
                for (seq, attempt) in record.attempts.iter().enumerate() {
                    let check = attempt.identifier_check.as_ref();
                    stmt.execute(params![
                        record.id.as_str(),
                        seq as i64,
                        attempt.channel.to_string(),
                        attempt.outcome.to_string(),
                        attempt.provider_identifier,
                        attempt.failure.as_ref().map(|f| f.kind.to_string()),
                        attempt.failure.as_ref().map(|f| f.detail.clone()),
                        check.map(|c| c.is_valid),
                        check.and_then(|c| c.reason).map(|r| r.to_string()),
                        check.map(|c| c.detail.clone()),
                        encode_ts(&attempt.attempted_at),
                        encode_ts(&attempt.completed_at),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Records newest first by `created_at`, ties broken by id.
pub async fn recent_deliveries(
    db: &Database,
    query: &HistoryQuery,
) -> Result<Vec<DeliveryRecord>, CourierError> {
    let recipient = query.recipient.as_ref().map(|r| r.as_str().to_string());
    let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM delivery_records
                 WHERE (?1 IS NULL OR recipient = ?1)
                 ORDER BY created_at DESC, id ASC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let mut records = stmt
                .query_map(params![recipient, limit, offset], record_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            for record in &mut records {
                record.attempts = load_attempts(conn, &record.id)?;
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// One record by id, or `None`.
pub async fn get_delivery(
    db: &Database,
    id: &DeliveryId,
) -> Result<Option<DeliveryRecord>, CourierError> {
    let id = id.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM delivery_records WHERE id = ?1"),
                    params![id],
                    record_from_row,
                )
                .optional()?;
            match record {
                Some(mut record) => {
                    record.attempts = load_attempts(conn, &record.id)?;
                    Ok(Some(record))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Build a record without attempts from a `RECORD_COLUMNS` row.
fn record_from_row(row: &Row<'_>) -> Result<DeliveryRecord, rusqlite::Error> {
    let final_channel: Option<String> = row.get(4)?;
    Ok(DeliveryRecord {
        id: DeliveryId(row.get(0)?),
        recipient: NormalizedRecipient::from_canonical(row.get::<_, String>(1)?),
        body: row.get(2)?,
        category: decode_enum(3, &row.get::<_, String>(3)?)?,
        attempts: Vec::new(),
        final_channel: final_channel
            .map(|c| decode_enum(4, &c))
            .transpose()?,
        final_outcome: decode_enum(5, &row.get::<_, String>(5)?)?,
        created_at: decode_ts(6, &row.get::<_, String>(6)?)?,
        sealed_at: decode_ts(7, &row.get::<_, String>(7)?)?,
    })
}

fn load_attempts(
    conn: &Connection,
    record_id: &DeliveryId,
) -> Result<Vec<ChannelAttempt>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "SELECT channel, outcome, provider_identifier, failure_kind, failure_detail,
                identifier_valid, identifier_reason, identifier_detail,
                attempted_at, completed_at
         FROM delivery_attempts WHERE record_id = ?1 ORDER BY seq ASC",
    )?;
    let attempts = stmt
        .query_map(params![record_id.as_str()], attempt_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attempts)
}

fn attempt_from_row(row: &Row<'_>) -> Result<ChannelAttempt, rusqlite::Error> {
    let failure_kind: Option<String> = row.get(3)?;
    let failure = match failure_kind {
        Some(kind) => Some(TransportError::new(
            decode_enum(3, &kind)?,
            row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        )),
        None => None,
    };

    let identifier_valid: Option<bool> = row.get(5)?;
    let identifier_check = match identifier_valid {
        Some(is_valid) => {
            let reason: Option<String> = row.get(6)?;
            Some(ValidationResult {
                is_valid,
                reason: reason.map(|r| decode_enum(6, &r)).transpose()?,
                detail: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            })
        }
        None => None,
    };

    Ok(ChannelAttempt {
        channel: decode_enum(0, &row.get::<_, String>(0)?)?,
        outcome: decode_enum(1, &row.get::<_, String>(1)?)?,
        provider_identifier: row.get(2)?,
        failure,
        identifier_check,
        attempted_at: decode_ts(8, &row.get::<_, String>(8)?)?,
        completed_at: decode_ts(9, &row.get::<_, String>(9)?)?,
    })
}
