//! Per-worker connection setup and schema creation.

use std::path::Path;

use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, SqliteConnection};

use crate::config::DB_BUSY_TIMEOUT;
use crate::error_handling::DatabaseError;

/// Supplies one live, dedicated connection per worker on demand.
///
/// Every connection is opened with WAL journaling (so concurrent writers are
/// ordinary multi-connection SQLite semantics) and a busy timeout instead of
/// failing fast on lock contention.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    options: SqliteConnectOptions,
}

impl ConnectionFactory {
    /// Creates a factory for the database at `db_path`, creating the file on
    /// first connect if it doesn't exist.
    pub fn new(db_path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(DB_BUSY_TIMEOUT);
        Self { options }
    }

    /// Opens a new dedicated connection.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ConnectError`] if the connection cannot be
    /// established; the caller (one worker) aborts, siblings are unaffected.
    pub async fn connect(&self) -> Result<SqliteConnection, DatabaseError> {
        let conn = self
            .options
            .clone()
            .connect()
            .await
            .map_err(DatabaseError::ConnectError)?;
        debug!("Opened dedicated SQLite connection");
        Ok(conn)
    }
}

/// Creates the destination table if it doesn't exist.
///
/// Idempotent; run once before any worker starts.
pub async fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), DatabaseError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            address TEXT NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_factory_creates_database_file() {
        let dir = TempDir::new().expect("tempdir");
        let db_path = dir.path().join("test.db");

        let factory = ConnectionFactory::new(&db_path);
        let _conn = factory.connect().await.expect("connect");
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let factory = ConnectionFactory::new(&dir.path().join("test.db"));
        let mut conn = factory.connect().await.expect("connect");

        ensure_schema(&mut conn).await.expect("first create");
        ensure_schema(&mut conn).await.expect("second create");
    }

    #[tokio::test]
    async fn test_connect_fails_on_unusable_path() {
        // A directory path is not a valid database file.
        let dir = TempDir::new().expect("tempdir");
        let factory = ConnectionFactory::new(dir.path());
        assert!(factory.connect().await.is_err());
    }
}
