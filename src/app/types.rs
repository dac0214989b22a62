//! Types shared by the command runners.

use serde::Serialize;

use crate::{db::SqlDialect, engine::DatabaseInfo};

/// Output of a command, printed by `main`
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout:    Vec<String>
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: Vec<String>) -> Self {
        Self {
            exit_code,
            stdout
        }
    }
}

/// Result of the `check` command
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub connected: bool,
    pub dialect:   String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database:  Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables:    Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:     Option<String>
}

impl CheckReport {
    pub fn connected(dialect: SqlDialect, info: DatabaseInfo) -> Self {
        Self {
            connected: true,
            dialect:   dialect.to_string(),
            version:   Some(info.version),
            database:  Some(info.database),
            tables:    info.tables,
            error:     None
        }
    }

    pub fn failed(dialect: SqlDialect, error: impl Into<String>) -> Self {
        Self {
            connected: false,
            dialect:   dialect.to_string(),
            version:   None,
            database:  None,
            tables:    Vec::new(),
            error:     Some(error.into())
        }
    }
}

/// One line of input in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Blank line
    Empty,
    /// `quit`, `exit` or `\q`
    Quit,
    /// `help`
    Help,
    /// `tables`
    Tables,
    /// `preview <table> [limit]`
    Preview {
        table: String,
        limit: Option<u64>
    },
    /// `sql <statement>`
    Sql(String),
    /// Anything else is a question
    Ask(String),
    /// Recognised keyword with bad arguments
    Usage(&'static str)
}
