//! Database boundary.
//!
//! A [`Database`] hands out short-lived [`Connection`]s: callers acquire one
//! for the duration of a single operation and the handle is released when it
//! is dropped, on every exit path. Connections are not shared between
//! concurrent callers.
//!
//! Two backends are provided:
//!
//! | Backend | Driver | Metadata queries |
//! |---------|--------|------------------|
//! | MySQL | `mysql_async` | `SHOW TABLES`, `DESCRIBE <table>`, `VERSION()` |
//! | SQLite | `rusqlite` | `sqlite_master`, `PRAGMA table_info`, `sqlite_version()` |

mod mysql;
mod sqlite;

use std::fmt;

use async_trait::async_trait;
pub use mysql::MySqlDatabase;
use serde::Serialize;
pub use sqlite::SqliteDatabase;

use crate::{error::EngineResult, query::Value, schema::ColumnDescriptor};

/// SQL dialect spoken by the connected database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    MySQL,
    SQLite
}

impl SqlDialect {
    /// Human-readable dialect name used in prompts
    pub fn name(self) -> &'static str {
        match self {
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite"
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw rows of a read statement, positional per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<Value>>
}

/// Server version and active database name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub version:  String,
    pub database: String
}

/// Source of database connections
#[async_trait]
pub trait Database: Send + Sync {
    /// Dialect of the underlying store
    fn dialect(&self) -> SqlDialect;

    /// Acquire a connection for one operation.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the store cannot be reached.
    async fn connect(&self) -> EngineResult<Box<dyn Connection>>;
}

/// One acquired database connection.
///
/// Writes are committed as soon as they complete; there are no explicit
/// transaction boundaries.
#[async_trait]
pub trait Connection: Send {
    /// Enumerate table names in the active database
    async fn list_tables(&mut self) -> EngineResult<Vec<String>>;

    /// Column metadata of one table, in declaration order
    async fn describe_table(&mut self, table: &str) -> EngineResult<Vec<ColumnDescriptor>>;

    /// Run a statement that produces rows
    async fn fetch(&mut self, sql: &str) -> EngineResult<RawRows>;

    /// Run a statement that changes data and return the affected row count
    async fn execute(&mut self, sql: &str) -> EngineResult<u64>;

    /// Server version and the database the connection is attached to
    async fn server_info(&mut self) -> EngineResult<ServerInfo>;
}
