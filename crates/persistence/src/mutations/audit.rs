// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes to the general audit trail.
//!
//! The caller's transaction is reused, so an event commits or rolls back
//! with the change it records.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ferry_book_audit::AuditEvent;
use time::OffsetDateTime;
use tracing::debug;

use crate::codec::encode_instant;
use crate::connection::InsertedRowId;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Appends `event` and returns its row id.
///
/// Actor, cause, action and both snapshots are stored as JSON using the
/// audit types' own serde representation.
///
/// # Errors
///
/// Returns an error if a part cannot be serialized or the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    recorded_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_events::table)
        .values((
            audit_events::entity_type.eq(&event.scope.entity_type),
            audit_events::entity_id.eq(event.scope.entity_id),
            audit_events::actor_json.eq(serde_json::to_string(&event.actor)?),
            audit_events::cause_json.eq(serde_json::to_string(&event.cause)?),
            audit_events::action_json.eq(serde_json::to_string(&event.action)?),
            audit_events::before_snapshot_json.eq(serde_json::to_string(&event.before)?),
            audit_events::after_snapshot_json.eq(serde_json::to_string(&event.after)?),
            audit_events::created_at.eq(encode_instant(recorded_at)?),
        ))
        .execute(conn)?;
    let event_id: i64 = conn.last_row_id()?;

    debug!(
        event_id,
        action = %event.action.name,
        entity_type = %event.scope.entity_type,
        entity_id = ?event.scope.entity_id,
        "Audit event recorded"
    );
    Ok(event_id)
}
