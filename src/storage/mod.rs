//! Chat persistence backed by a single SQLite file
//!
//! Three tables hold accounts (`users`), their chat sessions
//! (`chat_sessions`) and the ordered messages of each session
//! (`chat_messages`). Every public operation opens its own connection,
//! commits before returning and lets the connection drop on every exit path.

use crate::error::{Result, SaanraError};
use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod types;
pub use types::{AccountId, SenderRole, SessionId, SessionSummary, StoredMessage};

/// Environment variable that overrides the database location
pub const DB_PATH_ENV: &str = "SAANRA_DB";

/// File name used inside the platform data directory
pub const DB_FILE: &str = "saanra.db";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL CHECK (length(username) > 0),
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    session_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY(user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    sender TEXT NOT NULL,
    message TEXT,
    timestamp TEXT NOT NULL,
    FOREIGN KEY(session_id) REFERENCES chat_sessions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chat_sessions_user ON chat_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id);
";

/// Storage backend for accounts, chat sessions and messages
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Uses `SAANRA_DB` when set, otherwise `saanra.db` in the user's data
    /// directory. The schema is created if it does not exist yet.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(DB_PATH_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "saanra", "saanra")
            .ok_or_else(|| SaanraError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join(DB_FILE))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use saanra::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("chat.db")).unwrap();
    /// assert!(storage.db_path().exists());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;
            }
        }

        let storage = Self { db_path };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Ensure all three tables exist. Safe to call any number of times.
    pub fn initialize_schema(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute_batch(SCHEMA)
            .context("Failed to create tables")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tracing::info!("Chat database ready at {}", self.db_path.display());
        Ok(())
    }

    /// Register a new account
    ///
    /// Returns `false` when the username is already taken (or empty). The
    /// constraint violation is absorbed here and the table is left untouched.
    pub fn create_account(&self, username: &str, password: &str) -> Result<bool> {
        let conn = self.connect()?;

        match conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password],
        ) {
            Ok(_) => {
                tracing::info!("Created account '{}'", username);
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                tracing::warn!("Account '{}' rejected by constraint", username);
                Ok(false)
            }
            Err(e) => Err(SaanraError::Storage(format!("Failed to insert account: {}", e)).into()),
        }
    }

    /// Look up the account matching both username and password
    ///
    /// Passwords are compared verbatim. A wrong username and a wrong password
    /// both yield `None`.
    pub fn authenticate_account(&self, username: &str, password: &str) -> Result<Option<AccountId>> {
        let conn = self.connect()?;

        let id = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1 AND password = ?2",
                params![username, password],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .context("Failed to query account")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(id.map(AccountId))
    }

    /// Create a chat session owned by `account` and return its identifier
    pub fn create_session(&self, account: AccountId, name: &str) -> Result<SessionId> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO chat_sessions (user_id, session_name, created_at) VALUES (?1, ?2, ?3)",
            params![account.0, name, now_timestamp()],
        )
        .context("Failed to insert chat session")
        .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        let id = SessionId(conn.last_insert_rowid());
        tracing::info!("Created chat session {} for account {}", id, account);
        Ok(id)
    }

    /// Append one message to a session
    pub fn append_message(
        &self,
        session: SessionId,
        sender: SenderRole,
        body: Option<&str>,
    ) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT INTO chat_messages (session_id, sender, message, timestamp)
            VALUES (?1, ?2, ?3, ?4)",
            params![session.0, sender.as_str(), body, now_timestamp()],
        )
        .context("Failed to insert chat message")
        .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tracing::debug!("Appended {} message to session {}", sender, session);
        Ok(())
    }

    /// List an account's sessions, newest first
    pub fn list_sessions(&self, account: AccountId) -> Result<Vec<SessionSummary>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, session_name, created_at
                FROM chat_sessions
                WHERE user_id = ?1
                ORDER BY created_at DESC, id DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        let sessions = stmt
            .query_map(params![account.0], |row| {
                let created_at: String = row.get(2)?;
                Ok(SessionSummary {
                    id: SessionId(row.get(0)?),
                    name: row.get(1)?,
                    created_at: parse_timestamp(&created_at)
                        .map_err(|e| conversion_error(2, e))?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .context("Failed to query chat sessions")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(sessions)
    }

    /// List a session's messages, oldest first
    ///
    /// Messages sharing a timestamp keep their insertion order.
    pub fn list_messages(&self, session: SessionId) -> Result<Vec<StoredMessage>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT sender, message, timestamp
                FROM chat_messages
                WHERE session_id = ?1
                ORDER BY timestamp ASC, id ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        let messages = stmt
            .query_map(params![session.0], |row| {
                let sender: String = row.get(0)?;
                let timestamp: String = row.get(2)?;
                Ok(StoredMessage {
                    sender: sender.parse().map_err(|e| conversion_error(0, e))?,
                    body: row.get(1)?,
                    timestamp: parse_timestamp(&timestamp).map_err(|e| conversion_error(2, e))?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .context("Failed to query chat messages")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(messages)
    }

    /// Rename a session. Unknown identifiers are a silent no-op.
    pub fn rename_session(&self, session: SessionId, new_name: &str) -> Result<()> {
        let conn = self.connect()?;

        let updated = conn
            .execute(
                "UPDATE chat_sessions SET session_name = ?1 WHERE id = ?2",
                params![new_name, session.0],
            )
            .context("Failed to rename chat session")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tracing::debug!("Rename of session {} touched {} row(s)", session, updated);
        Ok(())
    }

    /// Delete a session together with all of its messages
    ///
    /// Messages are removed before the session row, inside one transaction.
    pub fn delete_session(&self, session: SessionId) -> Result<()> {
        let mut conn = self.connect()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        let messages = tx
            .execute(
                "DELETE FROM chat_messages WHERE session_id = ?1",
                params![session.0],
            )
            .context("Failed to delete chat messages")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tx.execute("DELETE FROM chat_sessions WHERE id = ?1", params![session.0])
            .context("Failed to delete chat session")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        tracing::info!("Deleted session {} and {} message(s)", session, messages);
        Ok(())
    }

    /// Number of registered accounts
    pub fn count_accounts(&self) -> Result<usize> {
        let conn = self.connect()?;

        let count: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |row| row.get(0))
            .context("Failed to count accounts")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(count as usize)
    }

    /// Number of messages owned by `session`
    pub fn count_messages(&self, session: SessionId) -> Result<usize> {
        let conn = self.connect()?;

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM chat_messages WHERE session_id = ?1",
                params![session.0],
                |row| row.get(0),
            )
            .context("Failed to count messages")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(count as usize)
    }

    /// Account owning `session`, or `None` if the session does not exist
    pub fn session_owner(&self, session: SessionId) -> Result<Option<AccountId>> {
        let conn = self.connect()?;

        let owner: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM chat_sessions WHERE id = ?1",
                params![session.0],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up session owner")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(owner.map(AccountId))
    }

    /// Open a connection with foreign keys enforced
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .and_then(|_| conn.execute_batch("PRAGMA foreign_keys = ON;"))
            .context("Failed to configure connection")
            .map_err(|e| SaanraError::Storage(format!("{:#}", e)))?;

        Ok(conn)
    }
}

/// Current time in a fixed-width form whose text order is chronological
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 and SQLite's `CURRENT_TIMESTAMP` layout.
fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Invalid timestamp '{}': {}", raw, e))
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, message.into())
}
