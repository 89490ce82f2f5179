//! Database Connection Management
//!
//! This module provides the persistence gateway for Vicoo: a single embedded
//! libsql database file, its schema, and the narrow query/execute/flush
//! primitives every other component goes through.
//!
//! # Architecture
//!
//! - **Single owner**: One process owns the database file; nothing else opens it
//! - **WAL mode**: Write-Ahead Logging; `flush()` checkpoints the WAL into the main file
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS` on every start
//! - **Typed boundary**: Query primitives take a row-mapping closure, so
//!   callers always receive typed records
//!
//! # Database Connection Patterns
//!
//! **ALWAYS use `connect_with_timeout()` in async functions.** Connections are
//! cheap handles; each gateway call opens one, sets the 5-second busy timeout,
//! and drops it when done. The busy timeout lets the synthesis job and the CRUD
//! surface serialize on the single writer instead of failing with
//! `SQLITE_BUSY`.
//!
//! ```no_run
//! # use vicoo_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseService::new(PathBuf::from("./data/vicoo.db")).await?;
//! let titles = db
//!     .query_all("SELECT title FROM notes ORDER BY timestamp DESC", (), |row| {
//!         Ok(row.get::<String>(0)?)
//!     })
//!     .await?;
//! db.flush().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::params::IntoParams;
use libsql::{Builder, Database, Row};
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable overriding the database location
pub const DATABASE_PATH_ENV: &str = "DATABASE_URL";

/// Table definitions shared with the CRUD surface
///
/// Column defaults mirror what the web, desktop and mobile clients expect, so a
/// database created here is interchangeable with one created by the API server.
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "notes",
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL DEFAULT 'dev_user_1',
            title TEXT NOT NULL,
            category TEXT DEFAULT 'idea',
            snippet TEXT,
            content TEXT DEFAULT '',
            summary TEXT,
            published INTEGER DEFAULT 0,
            cover_image TEXT,
            color TEXT,
            icon TEXT,
            timestamp TEXT DEFAULT (datetime('now')),
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            name TEXT UNIQUE NOT NULL,
            color TEXT DEFAULT '#6B7280',
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "note_tags",
        "CREATE TABLE IF NOT EXISTS note_tags (
            note_id TEXT NOT NULL,
            tag_id TEXT NOT NULL,
            PRIMARY KEY (note_id, tag_id)
        )",
    ),
    (
        "categories",
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            color TEXT DEFAULT '#6B7280',
            sub_tags TEXT DEFAULT '[]',
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "clusters",
        "CREATE TABLE IF NOT EXISTS clusters (
            id TEXT PRIMARY KEY,
            suggested_label TEXT NOT NULL,
            confidence REAL DEFAULT 0,
            items TEXT DEFAULT '[]',
            reason TEXT,
            status TEXT DEFAULT 'pending',
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "nodes",
        // linked_note_id is a weak reference: no foreign key, may dangle
        "CREATE TABLE IF NOT EXISTS nodes (
            id TEXT PRIMARY KEY,
            x REAL DEFAULT 0,
            y REAL DEFAULT 0,
            label TEXT NOT NULL,
            type TEXT DEFAULT 'planet',
            color TEXT DEFAULT '#FFD166',
            icon TEXT DEFAULT 'circle',
            description TEXT,
            linked_note_id TEXT,
            tags TEXT DEFAULT '[]',
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "links",
        "CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            target TEXT NOT NULL,
            type TEXT DEFAULT 'solid',
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "timeline_events",
        "CREATE TABLE IF NOT EXISTS timeline_events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            type TEXT DEFAULT 'note',
            related_note_id TEXT,
            color TEXT DEFAULT '#FFD166',
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "focus_sessions",
        "CREATE TABLE IF NOT EXISTS focus_sessions (
            id TEXT PRIMARY KEY,
            duration INTEGER DEFAULT 25,
            break_duration INTEGER DEFAULT 5,
            completed INTEGER DEFAULT 0,
            started_at TEXT DEFAULT (datetime('now')),
            ended_at TEXT
        )",
    ),
    (
        "user_settings",
        "CREATE TABLE IF NOT EXISTS user_settings (
            id TEXT PRIMARY KEY DEFAULT 'dev_user_1',
            theme TEXT DEFAULT 'dark',
            language TEXT DEFAULT 'en',
            mascot_skin TEXT DEFAULT 'bot',
            font_size TEXT DEFAULT 'medium',
            focus_default_duration INTEGER DEFAULT 25,
            focus_break_duration INTEGER DEFAULT 5,
            focus_sound_enabled INTEGER DEFAULT 1,
            updated_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "music",
        "CREATE TABLE IF NOT EXISTS music (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL DEFAULT 'dev_user_1',
            title TEXT NOT NULL,
            artist TEXT,
            cover_emoji TEXT DEFAULT '🎵',
            cover_url TEXT,
            color1 TEXT DEFAULT '#FFD166',
            color2 TEXT DEFAULT '#EF476F',
            filename TEXT NOT NULL,
            filepath TEXT NOT NULL,
            duration INTEGER DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
    (
        "seed_meta",
        "CREATE TABLE IF NOT EXISTS seed_meta (
            key TEXT PRIMARY KEY,
            created_at TEXT DEFAULT (datetime('now'))
        )",
    ),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_notes_user_id", "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes(user_id)"),
    ("idx_notes_category", "CREATE INDEX IF NOT EXISTS idx_notes_category ON notes(category)"),
    ("idx_notes_published", "CREATE INDEX IF NOT EXISTS idx_notes_published ON notes(published)"),
    ("idx_notes_timestamp", "CREATE INDEX IF NOT EXISTS idx_notes_timestamp ON notes(timestamp)"),
    ("idx_nodes_label", "CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label)"),
    (
        "idx_nodes_linked_note",
        "CREATE INDEX IF NOT EXISTS idx_nodes_linked_note ON nodes(linked_note_id)",
    ),
    ("idx_tags_name", "CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name)"),
];

/// Database service owning the embedded libsql database
///
/// # Examples
///
/// ```no_run
/// use vicoo_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_service = DatabaseService::new(PathBuf::from("/path/to/vicoo.db")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Enable WAL mode and the busy timeout
    /// 4. Create all tables and indexes (idempotent)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// connection fails, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        tracing::debug!(
            "Database ready at {} (new: {})",
            service.db_path.display(),
            is_new_database
        );

        Ok(service)
    }

    /// Resolve the database location
    ///
    /// `DATABASE_URL` wins when set; otherwise `~/.vicoo/data/vicoo.db`, falling
    /// back to `./data/vicoo.db` when no home directory is available.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        match dirs::home_dir() {
            Some(home) => home.join(".vicoo").join("data").join("vicoo.db"),
            None => PathBuf::from("data").join("vicoo.db"),
        }
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Newly created files get a WAL checkpoint so the schema is on disk before
    /// the first caller connects.
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        for (name, ddl) in TABLES {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create {} table: {}",
                    name, e
                ))
            })?;
        }

        for (name, ddl) in INDEXES {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create index '{}': {}",
                    name, e
                ))
            })?;
        }

        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Get a raw connection to the database
    ///
    /// **⚠️ WARNING**: Prefer `connect_with_timeout()`; a connection without the
    /// busy timeout fails immediately when the writer lock is held.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with the 5-second busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    /// Run a query and map the first row, if any
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - first row mapped by `map`
    /// * `Ok(None)` - the query produced no rows
    /// * `Err(DatabaseError)` - malformed SQL, execution or mapping failure
    pub async fn query_one<T, F>(
        &self,
        sql: &str,
        params: impl IntoParams,
        map: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: FnOnce(&Row) -> Result<T, DatabaseError>,
    {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Query failed: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?;

        row.as_ref().map(map).transpose()
    }

    /// Run a query and map every row, preserving the query's order
    pub async fn query_all<T, F>(
        &self,
        sql: &str,
        params: impl IntoParams,
        mut map: F,
    ) -> Result<Vec<T>, DatabaseError>
    where
        F: FnMut(&Row) -> Result<T, DatabaseError>,
    {
        let conn = self.connect_with_timeout().await?;

        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Query failed: {}", e)))?;

        let mut result = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            result.push(map(&row)?);
        }

        Ok(result)
    }

    /// Execute a statement for its side effect
    ///
    /// # Returns
    ///
    /// Number of rows affected
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(sql, params)
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Statement failed: {}", e)))
    }

    /// Durably persist committed writes to the main database file
    ///
    /// Checkpoints the WAL (PASSIVE mode, so concurrent readers are never
    /// blocked). Called after every mutating synthesis run and periodically by
    /// [`FlushTask`](crate::db::FlushTask).
    pub async fn flush(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        self.execute_pragma(&conn, "PRAGMA wal_checkpoint(PASSIVE)")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_db() -> (DatabaseService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_new_creates_parent_directory_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("vicoo.db");

        let db = DatabaseService::new(db_path.clone()).await.unwrap();
        assert!(db_path.exists());

        let tables = db
            .query_all(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                (),
                |row| Ok(row.get::<String>(0)?),
            )
            .await
            .unwrap();

        for (name, _) in TABLES {
            assert!(tables.iter().any(|t| t == name), "missing table {}", name);
        }
    }

    #[tokio::test]
    async fn test_schema_initialization_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let first = DatabaseService::new(db_path.clone()).await.unwrap();
        first
            .execute(
                "INSERT INTO tags (id, name) VALUES (?, ?)",
                ("t1", "rust"),
            )
            .await
            .unwrap();
        drop(first);

        let second = DatabaseService::new(db_path).await.unwrap();
        let count = second
            .query_one("SELECT COUNT(*) FROM tags", (), |row| Ok(row.get::<i64>(0)?))
            .await
            .unwrap();
        assert_eq!(count, Some(1));
    }

    #[tokio::test]
    async fn test_query_one_returns_none_for_empty_result() {
        let (db, _temp_dir) = create_test_db().await;
        let row = db
            .query_one("SELECT id FROM notes WHERE id = ?", ["missing"], |row| {
                Ok(row.get::<String>(0)?)
            })
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_execute_surfaces_constraint_violation() {
        let (db, _temp_dir) = create_test_db().await;
        db.execute("INSERT INTO tags (id, name) VALUES (?, ?)", ("t1", "rust"))
            .await
            .unwrap();

        let err = db
            .execute("INSERT INTO tags (id, name) VALUES (?, ?)", ("t2", "rust"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::SqlExecutionError { .. }));
    }

    #[tokio::test]
    async fn test_execute_surfaces_malformed_sql() {
        let (db, _temp_dir) = create_test_db().await;
        let err = db.execute("INSERT INTO nowhere VALUES (1)", ()).await.unwrap_err();
        assert!(err.to_string().contains("Statement failed"));
    }

    #[tokio::test]
    async fn test_flush_succeeds_after_writes() {
        let (db, _temp_dir) = create_test_db().await;
        db.execute(
            "INSERT INTO nodes (id, label) VALUES (?, ?)",
            ("n1", "Rust"),
        )
        .await
        .unwrap();
        tokio_test::assert_ok!(db.flush().await);
    }
}
