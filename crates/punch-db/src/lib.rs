//! Storage layer for the attendance clock.
//!
//! Provides persistence for users and punches using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with microseconds
//! (e.g., `2025-01-15T00:00:00.000000Z`). The fixed width keeps lexicographic
//! ordering identical to chronological ordering, so range queries can compare
//! strings directly.
//!
//! ## Punch Kinds
//!
//! The `kind` column holds the raw tag (`in`, `out`, `break_in`, `break_out`).
//! Writers go through [`PunchKind`], but rows are read back as strings so that
//! tags written by newer versions survive a round trip and are skipped by the
//! reducer instead of failing the read.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use punch_core::{PunchKind, PunchLike, PunchTime, UserName, ValidationError};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {id}: {timestamp}")]
    TimestampParse {
        id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored user name no longer passes validation.
    #[error("invalid user name for {id}")]
    InvalidUser {
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub name: UserName,
    pub created_at: DateTime<Utc>,
}

/// A stored punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PunchRecord {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl PunchLike for PunchRecord {
    fn punch_time(&self) -> PunchTime {
        PunchTime::from(self.timestamp)
    }

    fn kind_tag(&self) -> &str {
        &self.kind
    }
}

/// A punch joined with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedPunch {
    pub user: UserName,
    #[serde(flatten)]
    pub punch: PunchRecord,
}

/// Column values as read, before parsing.
struct RawPunch {
    id: String,
    user_id: String,
    kind: String,
    timestamp: String,
}

impl RawPunch {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            timestamp: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<PunchRecord, DbError> {
        let timestamp = parse_timestamp(&self.timestamp, &self.id)?;
        Ok(PunchRecord {
            id: self.id,
            user_id: self.user_id,
            kind: self.kind,
            timestamp,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Punches table: one row per clock terminal press
            -- timestamp: RFC 3339 UTC with microseconds
            -- kind: raw tag ('in', 'out', 'break_in', 'break_out')
            CREATE TABLE IF NOT EXISTS punches (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_punches_timestamp ON punches(timestamp);
            CREATE INDEX IF NOT EXISTS idx_punches_user_timestamp ON punches(user_id, timestamp);
            ",
        )?;
        tracing::debug!("database schema ready");
        Ok(())
    }

    /// Returns the user with `name`, creating it if absent.
    pub fn ensure_user(&self, name: &UserName) -> Result<UserRecord, DbError> {
        let created_at = format_timestamp(Utc::now());
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (id, name, created_at) VALUES (?, ?, ?)",
            params![Uuid::new_v4().to_string(), name.as_str(), created_at],
        )?;
        if inserted > 0 {
            tracing::debug!(user = %name, "registered user");
        }
        self.find_user(name)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Looks up a user by name.
    pub fn find_user(&self, name: &UserName) -> Result<Option<UserRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM users WHERE name = ?",
                [name.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(id, name, created_at)| user_record(id, name, created_at))
            .transpose()
    }

    /// Lists users ordered by name.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM users ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut users = Vec::new();
        for row in rows {
            let (id, name, created_at) = row?;
            users.push(user_record(id, name, created_at)?);
        }
        Ok(users)
    }

    /// Records a punch for `user`.
    pub fn insert_punch(
        &self,
        user: &UserRecord,
        kind: PunchKind,
        at: DateTime<Utc>,
    ) -> Result<PunchRecord, DbError> {
        let record = PunchRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            kind: kind.as_str().to_string(),
            timestamp: at,
        };
        self.conn.execute(
            "INSERT INTO punches (id, user_id, kind, timestamp) VALUES (?, ?, ?, ?)",
            params![
                record.id,
                record.user_id,
                record.kind,
                format_timestamp(record.timestamp)
            ],
        )?;
        tracing::debug!(user = %user.name, %kind, %at, "recorded punch");
        Ok(record)
    }

    /// Lists a user's punches within a time range, oldest first.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn punches_for_user_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PunchRecord>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, kind, timestamp
            FROM punches
            WHERE user_id = ? AND timestamp >= ? AND timestamp < ?
            ORDER BY timestamp ASC, rowid ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![user_id, format_timestamp(start), format_timestamp(end)],
            RawPunch::from_row,
        )?;
        let mut punches = Vec::new();
        for row in rows {
            punches.push(row?.into_record()?);
        }
        Ok(punches)
    }

    /// Lists every user's punches within a time range, oldest first.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn punches_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<NamedPunch>, DbError> {
        self.named_punches(start, end, "ASC", None)
    }

    /// Lists the latest punches within a time range, newest first.
    pub fn recent_punches(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<NamedPunch>, DbError> {
        self.named_punches(start, end, "DESC", Some(limit))
    }

    fn named_punches(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: &'static str,
        limit: Option<usize>,
    ) -> Result<Vec<NamedPunch>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let sql = format!(
            "
            SELECT p.id, p.user_id, p.kind, p.timestamp, u.name
            FROM punches p
            JOIN users u ON u.id = p.user_id
            WHERE p.timestamp >= ? AND p.timestamp < ?
            ORDER BY p.timestamp {order}, p.rowid {order}
            LIMIT ?
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![format_timestamp(start), format_timestamp(end), limit],
            |row| {
                let raw = RawPunch::from_row(row)?;
                let name: String = row.get(4)?;
                Ok((raw, name))
            },
        )?;
        let mut punches = Vec::new();
        for row in rows {
            let (raw, name) = row?;
            let user = UserName::new(name).map_err(|source| DbError::InvalidUser {
                id: raw.user_id.clone(),
                source,
            })?;
            punches.push(NamedPunch {
                user,
                punch: raw.into_record()?,
            });
        }
        Ok(punches)
    }

    /// Counts stored punches.
    pub fn punch_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM punches", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn user_record(id: String, name: String, created_at: String) -> Result<UserRecord, DbError> {
    let created_at = parse_timestamp(&created_at, &id)?;
    let name = UserName::new(name).map_err(|source| DbError::InvalidUser {
        id: id.clone(),
        source,
    })?;
    Ok(UserRecord {
        id,
        name,
        created_at,
    })
}

fn parse_timestamp(timestamp: &str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
