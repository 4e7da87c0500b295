// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opening and tuning the `SQLite` connection.
//!
//! Diesel has no DSL for PRAGMAs or `last_insert_rowid()`, so the few raw
//! statements the adapter needs are kept here. Queries and mutations use
//! Diesel DSL and reach this module only through [`InsertedRowId`].

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Lock wait for a `BEGIN IMMEDIATE` writer before `SQLite` reports busy.
///
/// Contention beyond this is handled by the adapter's retry loop.
pub const LOCK_WAIT_MS: u32 = 5_000;

/// Where the database lives. Decides the journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Shared-cache in-memory database. Rollback journal only.
    Memory,
    /// On-disk database in WAL mode, so readers are not blocked by the
    /// booking writer.
    File,
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Row id of the most recent insert on this connection.
pub trait InsertedRowId {
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn last_row_id(&mut self) -> Result<i64, PersistenceError>;
}

impl InsertedRowId for SqliteConnection {
    fn last_row_id(&mut self) -> Result<i64, PersistenceError> {
        Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(self)?)
    }
}

/// Opens `url`, applies the connection pragmas, migrates the schema and
/// confirms that referential integrity is enforced.
///
/// # Errors
///
/// Returns an error if the connection, a pragma, or a migration fails, or
/// if `SQLite` refuses to enforce foreign keys.
pub fn open(url: &str, storage: Storage) -> Result<SqliteConnection, PersistenceError> {
    info!(url, ?storage, "Opening booking database");

    let mut conn: SqliteConnection = SqliteConnection::establish(url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    pragma(&mut conn, "foreign_keys = ON")?;
    pragma(&mut conn, &format!("busy_timeout = {LOCK_WAIT_MS}"))?;
    if storage == Storage::File {
        pragma(&mut conn, "journal_mode = WAL")?;
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    debug!(count = applied.len(), "Schema migrations applied");

    ensure_foreign_keys(&mut conn)?;
    Ok(conn)
}

/// Fails unless `PRAGMA foreign_keys` reports enforcement switched on.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` when it is off.
pub fn ensure_foreign_keys(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let row: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if row.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    Ok(())
}

fn pragma(conn: &mut SqliteConnection, setting: &str) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("PRAGMA {setting}"))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("PRAGMA {setting}: {e}")))?;
    Ok(())
}
