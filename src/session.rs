//! The user-facing helper: one database, opened on first use.

use futures::lock::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::{DatabaseConfig, OpenOptions};
use crate::driver::{Connection, Driver, ResultSet};
use crate::error::{HelperError, Result};
use crate::normalize::{self, Outcome};
use crate::schema::TableSpec;
use crate::statement::{QuotePolicy, SelectConfig, StatementBuilder};
use crate::value::{Condition, Item, Row};

/// What [`SqliteHelper::open`] reports about the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub database_name: String,
    /// The handle was already open and no new connection was made.
    pub reused: bool,
}

/// A session over one database.
///
/// Every operation validates its arguments and builds its SQL before the
/// driver is touched, then opens the connection if needed. The handle slot
/// stays locked for the whole of an open, so concurrent callers never open
/// the database twice.
pub struct SqliteHelper<D: Driver> {
    driver: D,
    config: DatabaseConfig,
    builder: StatementBuilder,
    connection: Mutex<Option<Arc<D::Connection>>>,
}

impl<D: Driver> SqliteHelper<D> {
    /// Create a helper from the positional open arguments
    pub fn new(
        driver: D,
        name: impl Into<String>,
        version: impl Into<String>,
        display_name: impl Into<String>,
        size: i64,
    ) -> Self {
        Self::from_config(driver, DatabaseConfig::new(name, version, display_name, size))
    }

    /// Create a helper from a single options object
    pub fn with_options(driver: D, options: OpenOptions) -> Self {
        Self::from_config(driver, DatabaseConfig::from_options(options))
    }

    pub fn from_config(driver: D, config: DatabaseConfig) -> Self {
        Self {
            driver,
            config,
            builder: StatementBuilder::new(),
            connection: Mutex::new(None),
        }
    }

    pub fn with_quote_policy(mut self, quote: QuotePolicy) -> Self {
        self.builder = StatementBuilder::with_quote_policy(quote);
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub async fn is_open(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Delete a database file through the driver. Needs no open session.
    pub async fn delete(driver: &D, database_name: &str) -> Result<Outcome> {
        Self::delete_config(driver, &DatabaseConfig::from_options(OpenOptions::new(database_name))).await
    }

    /// Delete the database `config` points at, honouring its location.
    pub async fn delete_config(driver: &D, config: &DatabaseConfig) -> Result<Outcome> {
        let name = config.name();
        if name.is_empty() {
            return Err(HelperError::MissingParameter("databaseName"));
        }
        let ack = logged("delete", normalize::settle(driver.delete_database(config).await))?;
        Ok(normalize::message(ack, &normalize::database_deleted(name)))
    }

    pub async fn open(&self) -> Result<ConnectionInfo> {
        let mut slot = self.connection.lock().await;
        let reused = slot.is_some();
        self.acquire(&mut slot).await?;
        Ok(ConnectionInfo {
            database_name: self.config.name().to_string(),
            reused,
        })
    }

    pub async fn close(&self) -> Result<Outcome> {
        let mut slot = self.connection.lock().await;
        let Some(connection) = slot.as_ref().map(Arc::clone) else {
            warn!(database = self.config.name(), "{}", normalize::NOT_OPENED);
            return Ok(Outcome::Message(normalize::NOT_OPENED.to_string()));
        };
        let ack = logged("close", normalize::settle(connection.close().await))?;
        *slot = None;
        Ok(normalize::message(ack, normalize::DATABASE_CLOSED))
    }

    pub async fn create_table(&self, spec: &TableSpec) -> Result<Outcome> {
        let sql = self.builder.create_table(spec)?;
        let response = self.execute("createTable", &sql).await?;
        Ok(normalize::outcome(response, normalize::CREATE_DONE))
    }

    pub async fn drop_table(&self, table_name: &str) -> Result<Outcome> {
        let sql = self.builder.drop_table(table_name)?;
        let response = self.execute("dropTable", &sql).await?;
        Ok(normalize::outcome(response, normalize::DROP_DONE))
    }

    /// Insert every item in one driver batch.
    pub async fn insert_items(&self, table_name: &str, items: &[Item]) -> Result<Outcome> {
        let statements = self.builder.insert_batch(table_name, items)?;
        let connection = self.connection().await?;
        debug!(operation = "insertItems", statements = statements.len(), "executing batch");
        let response = logged(
            "insertItems",
            normalize::settle(connection.sql_batch(&statements).await),
        )?;
        Ok(normalize::outcome(response, normalize::INSERT_DONE))
    }

    pub async fn delete_item(&self, table_name: &str, condition: Option<&Condition>) -> Result<Outcome> {
        let sql = self.builder.delete(table_name, condition)?;
        let outcome = normalize::outcome(
            self.execute("deleteItem", &sql).await?,
            normalize::DELETE_DONE,
        );
        info!(rows_affected = outcome.rows_affected(), "deleteItem affected rows");
        Ok(outcome)
    }

    pub async fn update_item(
        &self,
        table_name: &str,
        item: &Item,
        condition: Option<&Condition>,
    ) -> Result<Outcome> {
        let sql = self.builder.update(table_name, item, condition)?;
        let outcome = normalize::outcome(
            self.execute("updateItem", &sql).await?,
            normalize::UPDATE_DONE,
        );
        info!(rows_affected = outcome.rows_affected(), "updateItem affected rows");
        Ok(outcome)
    }

    pub async fn select_items(&self, table_name: &str, config: &SelectConfig) -> Result<Vec<Row>> {
        let sql = self.builder.select(table_name, config)?;
        let rows = normalize::rows(self.execute("selectItems", &sql).await?)?;
        info!(rows = rows.len(), "selectItems returned rows");
        Ok(rows)
    }

    async fn execute(&self, operation: &'static str, sql: &str) -> Result<Vec<ResultSet>> {
        let connection = self.connection().await?;
        debug!(operation, sql, "executing statement");
        logged(operation, normalize::settle(connection.execute_sql(sql).await))
    }

    /// The open handle, opening it first if necessary.
    async fn connection(&self) -> Result<Arc<D::Connection>> {
        let mut slot = self.connection.lock().await;
        self.acquire(&mut slot).await
    }

    async fn acquire(&self, slot: &mut Option<Arc<D::Connection>>) -> Result<Arc<D::Connection>> {
        if let Some(connection) = slot.as_ref() {
            return Ok(Arc::clone(connection));
        }
        logged("echoTest", normalize::settle(self.driver.echo_test().await))?;
        let connection = Arc::new(logged(
            "open",
            normalize::settle(self.driver.open_connection(&self.config).await),
        )?);
        *slot = Some(Arc::clone(&connection));
        Ok(connection)
    }
}

fn logged<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => info!(operation, "database {operation} success"),
        Err(err) => error!(operation, "database {operation} error, {err}"),
    }
    result
}
