//! Statement execution.
//!
//! No SQL is parsed here: the leading keyword alone decides whether a
//! statement is read (rows are fetched) or written (the affected-row count is
//! reported). Whatever text is passed in runs verbatim.

mod types;

use tracing::debug;
pub use types::{QueryResult, Row, StatementKind, Value};

use crate::{db::Connection, error::EngineResult};

/// Leading keywords that produce rows
pub const READ_KEYWORDS: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "EXPLAIN"];

/// Classify a statement by its first keyword, case-insensitively
pub fn classify(sql: &str) -> StatementKind {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if READ_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
    {
        StatementKind::Read
    } else {
        StatementKind::Write
    }
}

/// Run one statement on an acquired connection
///
/// # Errors
///
/// Returns an execution error carrying the driver's message.
pub async fn execute(conn: &mut dyn Connection, sql: &str) -> EngineResult<QueryResult> {
    let sql = sql.trim();
    let kind = classify(sql);
    debug!(kind = %kind, sql = %sql, "executing statement");
    match kind {
        StatementKind::Read => {
            let raw = conn.fetch(sql).await?;
            Ok(QueryResult::from_positional(raw.columns, raw.rows))
        }
        StatementKind::Write => {
            let count = conn.execute(sql).await?;
            Ok(QueryResult::Affected {
                count
            })
        }
    }
}
