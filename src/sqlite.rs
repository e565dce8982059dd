//! [`Driver`] implementation on top of `rusqlite`.
//!
//! Databases are files under a base directory. Every call runs on tokio's
//! blocking pool, so the driver must be used from inside a tokio runtime.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use rusqlite::{types::ValueRef, OpenFlags};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::driver::{Connection, Driver, ResultSet, Rows};
use crate::value::{Row, SqlValue};

/// Database name that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct SqliteDriver {
    base_dir: PathBuf,
}

impl SqliteDriver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// File a config resolves to.
    pub fn database_path(&self, config: &DatabaseConfig) -> PathBuf {
        let mut dir = self.base_dir.clone();
        if let Some(sub) = config.location().subdirectory() {
            dir.push(sub);
        }
        dir.join(config.name())
    }

    /// File a database is seeded from. Seeds are bundled next to the base
    /// directory; a leading `~` marks such a path and is dropped.
    pub fn seed_path(&self, source: &str) -> PathBuf {
        self.base_dir
            .join(source.strip_prefix('~').unwrap_or(source))
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    async fn echo_test(&self) -> anyhow::Result<()> {
        tokio::task::spawn_blocking(|| -> anyhow::Result<()> {
            let conn = rusqlite::Connection::open_in_memory()?;
            let echo: String = conn.query_row("SELECT 'echo'", [], |row| row.get(0))?;
            anyhow::ensure!(echo == "echo", "sqlite echo test returned {echo}");
            Ok(())
        })
        .await?
    }

    async fn open_connection(&self, config: &DatabaseConfig) -> anyhow::Result<SqliteConnection> {
        let name = config.name().to_string();
        if name.is_empty() {
            return Err(anyhow!("database name is empty"));
        }
        let path = self.database_path(config);
        let seed = config.create_from_location().map(|source| self.seed_path(source));
        let read_only = config.read_only();

        let conn = tokio::task::spawn_blocking(move || -> anyhow::Result<rusqlite::Connection> {
            if name == IN_MEMORY {
                return Ok(rusqlite::Connection::open_in_memory()?);
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            if let Some(seed) = seed.filter(|_| !path.exists()) {
                std::fs::copy(&seed, &path)
                    .with_context(|| format!("copying {} to {}", seed.display(), path.display()))?;
            }
            let flags = if read_only {
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
            } else {
                OpenFlags::default()
            };
            debug!(path = %path.display(), read_only, "opening sqlite database");
            Ok(rusqlite::Connection::open_with_flags(&path, flags)?)
        })
        .await??;

        Ok(SqliteConnection {
            inner: Arc::new(Mutex::new(Some(conn))),
        })
    }

    async fn delete_database(&self, config: &DatabaseConfig) -> anyhow::Result<Option<String>> {
        if config.name() == IN_MEMORY {
            return Ok(None);
        }
        let path = self.database_path(config);
        debug!(path = %path.display(), "deleting sqlite database");
        tokio::task::spawn_blocking(move || -> anyhow::Result<Option<String>> {
            std::fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
            Ok(None)
        })
        .await?
    }
}

/// An open `rusqlite` connection. `None` once closed.
pub struct SqliteConnection {
    inner: Arc<Mutex<Option<rusqlite::Connection>>>,
}

impl SqliteConnection {
    async fn with_connection<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let mut guard = inner
                .lock()
                .map_err(|_| anyhow!("sqlite connection lock poisoned"))?;
            let conn = guard.as_mut().ok_or_else(|| anyhow!("database is closed"))?;
            f(conn)
        })
        .await?
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn execute_sql(&self, sql: &str) -> anyhow::Result<Vec<ResultSet>> {
        let sql = sql.to_string();
        self.with_connection(move |conn| Ok(vec![run_statement(conn, &sql)?]))
            .await
    }

    async fn sql_batch(&self, statements: &[String]) -> anyhow::Result<Vec<ResultSet>> {
        let statements = statements.to_vec();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            let mut sets = Vec::with_capacity(statements.len());
            for sql in &statements {
                sets.push(run_statement(&tx, sql)?);
            }
            tx.commit()?;
            Ok(sets)
        })
        .await
    }

    async fn close(&self) -> anyhow::Result<Option<String>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || -> anyhow::Result<Option<String>> {
            let mut guard = inner
                .lock()
                .map_err(|_| anyhow!("sqlite connection lock poisoned"))?;
            let Some(conn) = guard.take() else {
                return Ok(None);
            };
            match conn.close() {
                Ok(()) => Ok(None),
                Err((conn, err)) => {
                    *guard = Some(conn);
                    Err(err.into())
                }
            }
        })
        .await?
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("insert"))
}

fn run_statement(conn: &rusqlite::Connection, sql: &str) -> anyhow::Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    if stmt.column_count() == 0 {
        let rows_affected = stmt.execute([])? as u64;
        let insert_id = (is_insert(sql) && rows_affected > 0).then(|| conn.last_insert_rowid());
        return Ok(ResultSet {
            rows: Rows::default(),
            rows_affected,
            insert_id,
        });
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = stmt
        .query_map([], |row| {
            let mut map = Row::new();
            for (i, name) in columns.iter().enumerate() {
                map.insert(name, to_value(row.get_ref(i)?));
            }
            Ok(map)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ResultSet::with_rows(rows))
}

fn to_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(r) => SqlValue::Real(r),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}
