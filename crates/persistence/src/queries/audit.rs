// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reads from the general audit trail.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ferry_book_audit::{AuditEvent, AuditScope};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::codec::decode_instant;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    entity_type: String,
    entity_id: Option<i64>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: String,
}

/// An audit event as stored, with its row id and commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAuditEvent {
    pub event_id: i64,
    pub recorded_at: OffsetDateTime,
    pub event: AuditEvent,
}

fn column<T: DeserializeOwned>(json: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(json).map_err(|e| PersistenceError::corrupt("audit_events", e.to_string()))
}

impl TryFrom<AuditEventRow> for StoredAuditEvent {
    type Error = PersistenceError;

    fn try_from(row: AuditEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: row.event_id,
            recorded_at: decode_instant("audit_events", &row.created_at)?,
            event: AuditEvent::new(
                column(&row.actor_json)?,
                column(&row.cause_json)?,
                column(&row.action_json)?,
                column(&row.before_snapshot_json)?,
                column(&row.after_snapshot_json)?,
                AuditScope::new(&row.entity_type, row.entity_id),
            ),
        })
    }
}

/// Lists audit events in commit order.
///
/// `entity_id` narrows the result only together with `entity_type`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored event is unreadable.
pub fn list_audit_events(
    conn: &mut SqliteConnection,
    entity_type: Option<&str>,
    entity_id: Option<i64>,
) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .into_boxed();
    if let Some(entity_type) = entity_type {
        query = query.filter(audit_events::entity_type.eq(entity_type.to_string()));
        if let Some(entity_id) = entity_id {
            query = query.filter(audit_events::entity_id.eq(entity_id));
        }
    }
    query
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(StoredAuditEvent::try_from)
        .collect()
}
