//! Boundary with the storage driver.
//!
//! The helper never talks to SQLite directly. Everything it needs from the
//! native layer is described by [`Driver`] (module level operations) and
//! [`Connection`] (operations on one open database).

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::value::Row;

/// Rows of one result set, addressed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    items: Vec<Row>,
}

impl Rows {
    pub fn new(items: Vec<Row>) -> Self {
        Self { items }
    }

    pub fn length(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: usize) -> Option<&Row> {
        self.items.get(index)
    }
}

/// Raw outcome of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub rows: Rows,
    pub rows_affected: u64,
    pub insert_id: Option<i64>,
}

impl ResultSet {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Rows::new(rows),
            ..Self::default()
        }
    }

    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }
}

/// Module level entry points of a storage driver.
#[async_trait]
pub trait Driver: Send + Sync {
    type Connection: Connection;

    /// Checks that the native layer is installed and answering.
    async fn echo_test(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn open_connection(&self, config: &DatabaseConfig) -> anyhow::Result<Self::Connection>;

    /// Removes the database `config` resolves to, location included.
    /// `None` means the driver had nothing to report.
    async fn delete_database(&self, config: &DatabaseConfig) -> anyhow::Result<Option<String>>;
}

/// One open database handle.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    async fn execute_sql(&self, sql: &str) -> anyhow::Result<Vec<ResultSet>>;

    /// Runs every statement or none of them.
    async fn sql_batch(&self, statements: &[String]) -> anyhow::Result<Vec<ResultSet>>;

    async fn close(&self) -> anyhow::Result<Option<String>>;
}
