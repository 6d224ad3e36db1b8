/*!
 * SQLite connection shared by the cache's shared tier and the dictionary.
 *
 * One connection per store, guarded by a mutex. Async callers go through
 * `execute_async`, which runs the closure on tokio's blocking pool.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;

use super::schema;

const DEFAULT_DB_FILENAME: &str = "textbridge.db";
const DEFAULT_DB_DIRNAME: &str = "textbridge";

/// How long a writer waits for another process holding the file lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cloneable handle to one SQLite store
#[derive(Clone)]
pub struct DatabaseConnection {
    /// `None` for in-memory stores
    db_path: Option<PathBuf>,
    connection: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("db_path", &self.path())
            .finish()
    }
}

impl DatabaseConnection {
    /// Open the store under the user data directory
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open or create a store file, creating missing parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }

        info!("Opening shared store at {}", db_path.display());
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set database busy timeout")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: Some(db_path),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Private store that disappears with the handle
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: None,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/textbridge/textbridge.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Store file, or `:memory:`
    pub fn path(&self) -> &Path {
        self.db_path.as_deref().unwrap_or(Path::new(":memory:"))
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    /// Run `f` on the calling thread while holding the connection
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        f(&conn)
    }

    /// Run `f` on the blocking pool while holding the connection
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Row counts and file size
    pub fn stats(&self) -> Result<DatabaseStats> {
        let (cache_count, dictionary_count) = self.execute(|conn| {
            let cache: i64 = conn.query_row("SELECT COUNT(*) FROM translation_cache", [], |row| row.get(0))?;
            let dictionary: i64 = conn.query_row("SELECT COUNT(*) FROM dictionary", [], |row| row.get(0))?;
            Ok((cache, dictionary))
        })?;

        let file_size_bytes = match &self.db_path {
            Some(path) => std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            None => 0,
        };

        Ok(DatabaseStats {
            cache_count,
            dictionary_count,
            file_size_bytes,
        })
    }
}

/// Store size summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Rows in the shared cache tier, expired ones included
    pub cache_count: i64,
    pub dictionary_count: i64,
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache entries: {}, Dictionary entries: {}, Size: {} KB",
            self.cache_count,
            self.dictionary_count,
            self.file_size_bytes / 1024
        )
    }
}
