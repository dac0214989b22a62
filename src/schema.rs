//! Live schema introspection and prompt context.
//!
//! [`introspect`] walks the connected database (tables in enumeration order,
//! columns in declaration order) and produces a [`TableSchema`]. The schema
//! is rendered for the model by [`TableSchema::to_context`], one line per
//! table.
//!
//! # Example
//!
//! ```
//! use nl_sql_engine::schema::{ColumnDescriptor, TableSchema};
//!
//! let mut schema = TableSchema::default();
//! schema.insert(
//!     "USERS",
//!     vec![
//!         ColumnDescriptor::new("ID", "int"),
//!         ColumnDescriptor::new("COUNTRY", "varchar")
//!     ]
//! );
//!
//! let context = schema.to_context();
//! assert!(context.contains("Table USERS: ID (int), COUNTRY (varchar)"));
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::{db::Connection, error::EngineResult};

/// Header placed above the per-table lines of the prompt context
pub const CONTEXT_HEADER: &str = "Available tables and columns:";

/// Substituted for the table lines when the database has no tables
pub const EMPTY_SCHEMA_PLACEHOLDER: &str =
    "The database contains no tables; no schema information is available.";

/// Column metadata as reported by the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name, exact casing
    pub name:      String,
    /// Declared type (e.g. "int(11)", "varchar(255)")
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether NULL values are allowed
    pub nullable:  bool,
    /// Whether the column is part of the primary key
    pub is_key:    bool,
    /// Declared default, if any
    pub default:   Option<String>,
    /// Extra attributes such as `auto_increment`
    pub extra:     String
}

impl ColumnDescriptor {
    /// Nullable, non-key column without default
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            data_type: data_type.into(),
            nullable:  true,
            is_key:    false,
            default:   None,
            extra:     String::new()
        }
    }
}

/// Table name to ordered columns, in table-enumeration order.
///
/// Built once per engine and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TableSchema {
    pub tables: IndexMap<String, Vec<ColumnDescriptor>>
}

impl TableSchema {
    pub fn insert(&mut self, table: impl Into<String>, columns: Vec<ColumnDescriptor>) {
        self.tables.insert(table.into(), columns);
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn columns(&self, table: &str) -> Option<&[ColumnDescriptor]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Render the schema for a model prompt.
    ///
    /// One line per table: `Table <name>: <col> (<type>), ...`. An empty
    /// schema yields an explanatory placeholder, never a blank string.
    pub fn to_context(&self) -> String {
        if self.tables.is_empty() {
            return format!("{}\n{}", CONTEXT_HEADER, EMPTY_SCHEMA_PLACEHOLDER);
        }
        let lines: Vec<String> = self
            .tables
            .iter()
            .map(|(name, columns)| format!("Table {}: {}", name, describe_columns(columns)))
            .collect();
        format!("{}\n{}", CONTEXT_HEADER, lines.join("\n"))
    }
}

/// `name (type), name (type), ...`
pub fn describe_columns(columns: &[ColumnDescriptor]) -> String {
    columns
        .iter()
        .map(|c| format!("{} ({})", c.name, c.data_type))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Enumerate every table and its columns on an acquired connection
///
/// # Errors
///
/// Returns an introspection error if listing tables or describing any of
/// them fails.
pub async fn introspect(conn: &mut dyn Connection) -> EngineResult<TableSchema> {
    let mut schema = TableSchema::default();
    for table in conn.list_tables().await? {
        let columns = conn.describe_table(&table).await?;
        debug!(table = %table, columns = columns.len(), "introspected table");
        schema.insert(table, columns);
    }
    Ok(schema)
}
