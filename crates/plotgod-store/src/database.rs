use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema;

/// Handle to a SQLite database.
///
/// Every operation runs on its own freshly opened connection: the pragmas
/// (foreign_keys in particular, which SQLite scopes to a connection) are
/// applied each time, and the connection closes when the operation returns.
/// There is no pooling and no long-lived shared connection.
#[derive(Clone)]
pub struct Database {
    target: Target,
}

#[derive(Clone)]
enum Target {
    File(PathBuf),
    /// Named shared-cache in-memory database (tests). The anchor connection
    /// keeps the database alive between per-operation connections.
    Memory {
        uri: String,
        _anchor: Arc<Mutex<Connection>>,
    },
}

impl Database {
    /// Open or create a database file at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        init_schema(&conn)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            target: Target::File(path.to_owned()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let uri = format!("file:plotgod-mem-{}?mode=memory&cache=shared", Uuid::now_v7());
        let anchor = open_memory_uri(&uri)?;
        init_schema(&anchor)?;

        Ok(Self {
            target: Target::Memory {
                uri,
                _anchor: Arc::new(Mutex::new(anchor)),
            },
        })
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = match &self.target {
            Target::File(path) => {
                Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?
            }
            Target::Memory { uri, .. } => open_memory_uri(uri)?,
        };
        conn.execute_batch(schema::PRAGMAS)
            .map_err(|e| StoreError::Database(format!("pragmas: {e}")))?;
        Ok(conn)
    }

    /// Run a closure on a fresh connection. Single statements autocommit;
    /// the connection closes when the closure returns.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Run a closure inside one explicit transaction on a fresh connection.
    /// Commit on success; any error drops the transaction, rolling back every
    /// statement issued inside it.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn path(&self) -> &Path {
        match &self.target {
            Target::File(path) => path,
            Target::Memory { .. } => Path::new(":memory:"),
        }
    }
}

fn open_memory_uri(uri: &str) -> Result<Connection, StoreError> {
    Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI,
    )
    .map_err(|e| StoreError::Database(e.to_string()))
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(schema::PRAGMAS)
        .map_err(|e| StoreError::Database(format!("pragmas: {e}")))?;

    conn.execute_batch(schema::CREATE_TABLES)
        .map_err(|e| StoreError::Database(format!("schema: {e}")))?;

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    if version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [schema::SCHEMA_VERSION],
        )
        .map_err(|e| StoreError::Database(format!("schema version: {e}")))?;
    }

    Ok(())
}
