use std::{
    path::{Path, PathBuf},
    sync::Arc
};

use async_trait::async_trait;
use rusqlite::{OpenFlags, types::ValueRef};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Connection, Database, RawRows, ServerInfo, SqlDialect};
use crate::{
    error::{EngineResult, connection_error, introspection_error},
    query::Value,
    schema::ColumnDescriptor
};

const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
                           WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                           ORDER BY name";

/// SQLite store backed by a file or by a single in-memory database
#[derive(Debug)]
pub enum SqliteDatabase {
    /// New connection per operation; the file must already exist
    File(PathBuf),
    /// One shared connection so data outlives each operation
    InMemory(Arc<Mutex<rusqlite::Connection>>)
}

impl SqliteDatabase {
    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> EngineResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| connection_error(format!("Failed to open in-memory SQLite: {}", e)))?;
        Ok(Self::InMemory(Arc::new(Mutex::new(conn))))
    }

    /// File path, or `:memory:` for an in-memory database
    pub fn from_path(path: &str) -> EngineResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::open(path))
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::SQLite
    }

    async fn connect(&self) -> EngineResult<Box<dyn Connection>> {
        let shared = match self {
            Self::File(path) => {
                let flags = OpenFlags::default() - OpenFlags::SQLITE_OPEN_CREATE;
                let conn = rusqlite::Connection::open_with_flags(path, flags).map_err(|e| {
                    connection_error(format!(
                        "Failed to open SQLite database '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Arc::new(Mutex::new(conn))
            }
            Self::InMemory(shared) => Arc::clone(shared)
        };
        Ok(Box::new(SqliteConnection {
            conn: shared.lock_owned().await
        }))
    }
}

/// Exclusive handle on a SQLite connection, released on drop
#[derive(Debug)]
pub struct SqliteConnection {
    conn: OwnedMutexGuard<rusqlite::Connection>
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn list_tables(&mut self) -> EngineResult<Vec<String>> {
        let raw = self
            .fetch(LIST_TABLES)
            .await
            .map_err(|e| introspection_error(e.to_string()))?;
        Ok(raw
            .rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(|v| v.to_string())
            .collect())
    }

    async fn describe_table(&mut self, table: &str) -> EngineResult<Vec<ColumnDescriptor>> {
        let sql = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
        let raw = self
            .fetch(&sql)
            .await
            .map_err(|e| introspection_error(format!("{}: {}", table, e)))?;
        // cid, name, type, notnull, dflt_value, pk
        let pk_count = raw
            .rows
            .iter()
            .filter(|row| matches!(row.get(5), Some(Value::Int(pk)) if *pk > 0))
            .count();
        Ok(raw
            .rows
            .iter()
            .map(|row| {
                let data_type = row.get(2).map(|v| v.to_string()).unwrap_or_default();
                let is_key = matches!(row.get(5), Some(Value::Int(pk)) if *pk > 0);
                let rowid_alias = is_key && pk_count == 1 && data_type.eq_ignore_ascii_case("INTEGER");
                ColumnDescriptor {
                    name: row.get(1).map(|v| v.to_string()).unwrap_or_default(),
                    nullable: !matches!(row.get(3), Some(Value::Int(1))),
                    is_key,
                    default: row.get(4).filter(|v| !v.is_null()).map(|v| v.to_string()),
                    extra: if rowid_alias {
                        String::from("auto_increment")
                    } else {
                        String::new()
                    },
                    data_type
                }
            })
            .collect())
    }

    async fn fetch(&mut self, sql: &str) -> EngineResult<RawRows> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(convert_value(row.get_ref(idx)?));
            }
            rows.push(values);
        }
        Ok(RawRows {
            columns,
            rows
        })
    }

    /// Steps the statement to completion, draining any rows it yields
    /// (`RETURNING`, `PRAGMA`, `WITH ... SELECT`).
    async fn execute(&mut self, sql: &str) -> EngineResult<u64> {
        let before = self.conn.total_changes();
        {
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.raw_query();
            while rows.next()?.is_some() {}
        }
        // changes() still holds the last DML count after DDL or a pure read
        if self.conn.total_changes() == before {
            Ok(0)
        } else {
            Ok(self.conn.changes())
        }
    }

    async fn server_info(&mut self) -> EngineResult<ServerInfo> {
        let version: String = self
            .conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(ServerInfo {
            version,
            database: String::from("main")
        })
    }
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec())
    }
}
