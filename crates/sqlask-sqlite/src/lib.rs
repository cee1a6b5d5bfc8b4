//! SQLite executor for validated queries

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use sqlask_core::{ExecutorError, NormalizedQuery, QueryExecutor, ResultSet, Row};
use thiserror::Error;

mod schema;
mod seed;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection lock poisoned")]
    Poisoned,
}

/// Strip a SQLAlchemy-style `sqlite:///` prefix from a database URL.
pub fn path_from_url(url: &str) -> &str {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
}

pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(&path)?;
        tracing::info!(path = %path.as_ref().display(), "Opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        schema::create_tables(&conn)?;
        Ok(())
    }

    /// Insert demo rows into an empty database; returns the rows inserted.
    pub fn seed_demo_data(&self) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        Ok(seed::seed_demo_data(&mut conn)?)
    }

    /// Refuse every write on this connection from now on.
    pub fn enforce_read_only(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA query_only = ON;")?;
        tracing::info!("Connection switched to read-only");
        Ok(())
    }

    /// Run `sql` synchronously on the calling thread.
    pub fn query(&self, sql: &str) -> Result<ResultSet, ExecutorError> {
        let conn = self
            .lock()
            .map_err(|e| ExecutorError::Unavailable(e.to_string()))?;
        run_query(&conn, sql)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, query: &NormalizedQuery) -> Result<ResultSet, ExecutorError> {
        let conn = Arc::clone(&self.conn);
        let sql = query.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| ExecutorError::Unavailable(StoreError::Poisoned.to_string()))?;
            run_query(&conn, &sql)
        })
        .await
        .map_err(|e| ExecutorError::Unavailable(e.to_string()))?
    }
}

fn run_query(conn: &Connection, sql: &str) -> Result<ResultSet, ExecutorError> {
    let mut stmt = conn.prepare(sql).map_err(db_error)?;
    if !stmt.readonly() {
        return Err(ExecutorError::Database(
            "attempt to run a statement that writes to the database".to_string(),
        ));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([]).map_err(db_error)?;

    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(db_error)? {
        let mut out = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            let value = row.get_ref(idx).map_err(db_error)?;
            out.insert(name.clone(), value_to_json(value));
        }
        result.push(out);
    }

    tracing::debug!(rows = result.len(), columns = columns.len(), "Fetched rows");
    Ok(result)
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::json!(i),
        ValueRef::Real(f) => serde_json::json!(f),
        ValueRef::Text(s) => serde_json::Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}

fn db_error(e: rusqlite::Error) -> ExecutorError {
    ExecutorError::Database(e.to_string())
}
