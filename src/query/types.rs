use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Scalar cell value returned by a read statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>)
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len())
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One result row keyed by column name, in column order
pub type Row = IndexMap<String, Value>;

/// Normalized result envelope of one executed statement.
///
/// Exactly one shape is populated: rows for read statements, an affected-row
/// count for everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    Rows {
        columns: Vec<String>,
        data:    Vec<Row>
    },
    Affected {
        count: u64
    }
}

impl QueryResult {
    /// Build a rows result from positional values.
    ///
    /// Every row is keyed by `columns`; short rows are padded with NULL so
    /// all rows share the same key set. A repeated column name keeps one key
    /// holding the last value, while `columns` keeps every name.
    pub fn from_positional(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let data: Vec<Row> = rows
            .into_iter()
            .map(|values| {
                let mut values = values.into_iter();
                columns
                    .iter()
                    .map(|col| (col.clone(), values.next().unwrap_or(Value::Null)))
                    .collect::<Row>()
            })
            .collect();
        Self::Rows {
            columns,
            data
        }
    }

    /// Number of data rows, or affected rows for write statements
    pub fn row_count(&self) -> u64 {
        match self {
            Self::Rows {
                data, ..
            } => data.len() as u64,
            Self::Affected {
                count
            } => *count
        }
    }

    pub fn is_rows(&self) -> bool {
        matches!(self, Self::Rows { .. })
    }
}

/// Statement category decided by the leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// SELECT, SHOW, DESCRIBE, EXPLAIN
    Read,
    /// Anything else
    Write
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write")
        }
    }
}
