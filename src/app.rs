//! Application logic for the `nl-sql` CLI.
//!
//! This module contains the command runners separated from the main entry
//! point to enable testing. Every runner returns a [`CommandOutput`]: the
//! lines to print and the process exit code (`0` on success, `1` when the
//! engine reported a failure).

mod convert;
mod helpers;
mod repl;
mod types;

use std::io;

pub use convert::{apply_cli, convert_format};
pub use helpers::{
    build_engine, create_output_options, exit_code_for, render_check, start_spinner
};
pub use repl::{HELP, parse_line, run_repl};
pub use types::{CheckReport, CommandOutput, ReplCommand};

use crate::{
    cli::Commands,
    engine::{EngineResponse, SqlEngine},
    error::AppResult,
    output::{OutputFormat, OutputOptions, render}
};

/// Runs one CLI command against the engine.
///
/// `Interactive` reads from stdin until `quit` or end of input and returns
/// an empty output.
///
/// # Errors
///
/// Only interactive mode fails, on terminal I/O errors.
pub async fn run_command(
    engine: &SqlEngine,
    command: &Commands,
    opts: &OutputOptions,
    preview_limit: u64
) -> AppResult<CommandOutput> {
    let output = match command {
        Commands::Ask {
            question,
            show_sql
        } => ask(engine, &question.join(" "), opts, *show_sql).await,
        Commands::Sql {
            statement
        } => run_sql(engine, &statement.join(" "), opts).await,
        Commands::Preview {
            table,
            limit
        } => preview(engine, table, limit.unwrap_or(preview_limit), opts).await,
        Commands::Tables => tables(engine, opts).await,
        Commands::Check => check(engine, opts).await,
        Commands::Interactive => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            run_repl(engine, stdin.lock(), &mut stdout, opts, preview_limit).await?;
            CommandOutput::new(0, Vec::new())
        }
    };
    Ok(output)
}

/// Answers a natural-language question
pub async fn ask(
    engine: &SqlEngine,
    question: &str,
    opts: &OutputOptions,
    show_sql: bool
) -> CommandOutput {
    let spinner = start_spinner(opts, "Generating SQL...");
    let response = engine.execute_natural_query(question).await;
    spinner.finish_and_clear();

    let mut stdout = Vec::new();
    if show_sql
        && opts.format == OutputFormat::Text
        && let Some(sql) = &response.sql_query
    {
        stdout.push(format!("SQL: {}\n", sql));
    }
    stdout.push(render(&response, opts));
    respond(&response, stdout)
}

/// Runs a statement directly
pub async fn run_sql(engine: &SqlEngine, sql: &str, opts: &OutputOptions) -> CommandOutput {
    let response = engine.execute_sql_query(sql).await;
    respond(&response, vec![render(&response, opts)])
}

/// Shows the first `limit` rows of a table
pub async fn preview(
    engine: &SqlEngine,
    table: &str,
    limit: u64,
    opts: &OutputOptions
) -> CommandOutput {
    let response = engine.get_table_preview(table, limit).await;
    respond(&response, vec![render(&response, opts)])
}

/// Lists tables with their columns
pub async fn tables(engine: &SqlEngine, opts: &OutputOptions) -> CommandOutput {
    let response = engine.list_tables().await;
    respond(&response, vec![render(&response, opts)])
}

/// Connects and enumerates tables, bypassing the schema cache
pub async fn check(engine: &SqlEngine, opts: &OutputOptions) -> CommandOutput {
    let report = match engine.check_connection().await {
        Ok(info) => CheckReport::connected(engine.dialect(), info),
        Err(e) => CheckReport::failed(engine.dialect(), e.to_string())
    };
    let exit_code = if report.connected { 0 } else { 1 };
    CommandOutput::new(exit_code, vec![render_check(&report, opts)])
}

fn respond(response: &EngineResponse, stdout: Vec<String>) -> CommandOutput {
    CommandOutput::new(exit_code_for(response), stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SqliteDatabase};

    fn text_opts() -> OutputOptions {
        OutputOptions {
            colored: false,
            ..Default::default()
        }
    }

    async fn engine() -> SqlEngine {
        let db = SqliteDatabase::in_memory().unwrap();
        {
            let mut conn = db.connect().await.unwrap();
            conn.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
                .await
                .unwrap();
            conn.execute("INSERT INTO users (name) VALUES ('ada'), ('grace')")
                .await
                .unwrap();
        }
        SqlEngine::new(Box::new(db), None).await
    }

    #[tokio::test]
    async fn test_run_sql_success() {
        let engine = engine().await;
        let output = run_sql(&engine, "SELECT name FROM users ORDER BY id", &text_opts()).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout[0].contains("ada"));
        assert!(output.stdout[0].contains("Total rows: 2"));
    }

    #[tokio::test]
    async fn test_run_sql_failure_exit_code() {
        let engine = engine().await;
        let output = run_sql(&engine, "SELECT * FROM missing", &text_opts()).await;
        assert_eq!(output.exit_code, 1);
        assert!(output.stdout[0].starts_with("Error: Database error:"));
    }

    #[tokio::test]
    async fn test_preview_limit() {
        let engine = engine().await;
        let output = preview(&engine, "users", 1, &text_opts()).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout[0].contains("Total rows: 1"));
    }

    #[tokio::test]
    async fn test_tables_lists_columns() {
        let engine = engine().await;
        let output = tables(&engine, &text_opts()).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout[0].contains("id (INTEGER), name (TEXT)"));
    }

    #[tokio::test]
    async fn test_check_connected() {
        let engine = engine().await;
        let output = check(&engine, &text_opts()).await;
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout[0].contains("1 tables"));
        assert!(output.stdout[0].contains("Current database: main"));
    }

    #[tokio::test]
    async fn test_ask_without_client_fails() {
        let engine = engine().await;
        let output = ask(&engine, "how many users?", &text_opts(), true).await;
        assert_eq!(output.exit_code, 1);
        assert_eq!(output.stdout.len(), 1);
        assert!(output.stdout[0].contains("AI functionality not available"));
    }

    #[tokio::test]
    async fn test_run_command_sql_joins_words() {
        let engine = engine().await;
        let command = Commands::Sql {
            statement: vec!["SELECT".to_string(), "COUNT(*)".to_string(), "FROM users".to_string()]
        };
        let output = run_command(&engine, &command, &text_opts(), 5).await.unwrap();
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout[0].contains("COUNT(*)"));
    }
}
