//! High level table operations over an async SQLite driver.
//!
//! # Intention
//!
//! - Turn structured operation descriptions (create table, insert, update,
//!   delete, paged select) into SQL text.
//! - Normalize whatever the driver hands back into one `Result` shape.
//! - Open the connection on first use so callers never manage it by hand.
//!
//! # Architectural Boundaries
//!
//! - [`statement`] and [`normalize`] are pure and perform no I/O.
//! - The storage engine is reached only through the [`driver`] traits;
//!   [`sqlite`] provides the `rusqlite` implementation.
//! - No SQL parsing, no predicates beyond equality, no user-facing
//!   transactions.
//!
//! # Example
//!
//! ```no_run
//! use sqlite_helper::{Item, SelectConfig, SqliteDriver, SqliteHelper, TableSpec};
//!
//! # async fn run() -> sqlite_helper::Result<()> {
//! let helper = SqliteHelper::new(SqliteDriver::new("/tmp"), "test.db", "1.0", "users", -1);
//! helper
//!     .create_table(&TableSpec::new("people").with_field("name", "varchar").with_field("age", "int"))
//!     .await?;
//! helper
//!     .insert_items("people", &[Item::new().with_value("name", "mike").with_value("age", 22)])
//!     .await?;
//! let _rows = helper
//!     .select_items("people", &SelectConfig::new().with_columns(["name"]).with_page(1, 5))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod normalize;
pub mod request;
pub mod schema;
pub mod session;
pub mod sqlite;
pub mod statement;
pub mod value;

pub use config::{DatabaseConfig, DatabaseParams, Location, OpenOptions};
pub use driver::{Connection, Driver, ResultSet, Rows};
pub use error::{HelperError, Result};
pub use normalize::Outcome;
pub use request::{Operation, Response};
pub use schema::{Field, TableSpec};
pub use session::{ConnectionInfo, SqliteHelper};
pub use sqlite::{SqliteConnection, SqliteDriver};
pub use statement::{Columns, QuotePolicy, SelectConfig, StatementBuilder};
pub use value::{Condition, Item, Row, SqlValue};
