//! Scoped session and transaction acquisition

use crate::error::Result;
use crate::schema;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the SQLite database file.
///
/// Cheap to clone. Every operation opens its own connection, runs inside one
/// transaction and drops the connection on return, on error and on panic.
#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<PathBuf>,
}

impl Store {
    /// Open (or create) the database at `path` and apply the schema
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path: Arc::new(path),
        };

        let conn = store.session()?;
        schema::migrate(&conn)?;
        tracing::info!("Database ready at {}", store.path.display());

        Ok(store)
    }

    /// Open from a `DATABASE_URL` style string (`sqlite:` URL or plain path)
    pub fn open_url(url: &str) -> Result<Self> {
        Self::open(path_from_url(url))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection with foreign keys, WAL and a busy timeout
    pub fn session(&self) -> Result<Connection> {
        let conn = Connection::open(self.path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Run `f` inside an immediate transaction.
    /// Commits on Ok; any error or panic drops the transaction, which rolls back.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.session()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// [`Store::with_transaction`] on tokio's blocking pool
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.with_transaction(f)).await?
    }
}

/// Accepts `sqlite:///relative.db`, `sqlite:////abs/path.db`, `sqlite://x.db`,
/// `sqlite:x.db` or a bare path
pub fn path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    PathBuf::from(path)
}
