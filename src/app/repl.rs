//! Interactive question loop.
//!
//! | Input | Action |
//! |-------|--------|
//! | `tables` | List tables and columns |
//! | `preview <table> [limit]` | First rows of a table |
//! | `sql <statement>` | Run SQL directly |
//! | `help` | Show commands |
//! | `quit`, `exit`, `\q` | Leave |
//! | anything else | Natural-language question |

use std::io::{BufRead, Write};

use colored::Colorize;

use super::{
    ask, preview, run_sql, tables,
    types::{CommandOutput, ReplCommand}
};
use crate::{
    engine::{AI_UNAVAILABLE, EngineState, SqlEngine},
    error::{AppResult, io_error},
    output::OutputOptions
};

/// Commands accepted in interactive mode
pub const HELP: &str = "Commands:
  tables                     list tables and columns
  preview <table> [limit]    show the first rows of a table
  sql <statement>            run SQL directly
  help                       show this help
  quit                       leave
Anything else is translated to SQL and executed.";

const PROMPT: &str = "nl-sql> ";

/// Parse one input line
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, "")
    };
    match (keyword.to_ascii_lowercase().as_str(), rest.is_empty()) {
        ("quit" | "exit" | "\\q", true) => ReplCommand::Quit,
        ("help", true) => ReplCommand::Help,
        ("tables", true) => ReplCommand::Tables,
        ("preview", true) => ReplCommand::Usage("preview <table> [limit]"),
        ("preview", false) => parse_preview(rest),
        ("sql", true) => ReplCommand::Usage("sql <statement>"),
        ("sql", false) => ReplCommand::Sql(rest.to_string()),
        _ => ReplCommand::Ask(line.to_string())
    }
}

fn parse_preview(args: &str) -> ReplCommand {
    let mut parts = args.split_whitespace();
    let (Some(table), limit, None) = (parts.next(), parts.next(), parts.next()) else {
        return ReplCommand::Usage("preview <table> [limit]");
    };
    match limit.map(str::parse::<u64>) {
        None => ReplCommand::Preview {
            table: table.to_string(),
            limit: None
        },
        Some(Ok(limit)) => ReplCommand::Preview {
            table: table.to_string(),
            limit: Some(limit)
        },
        Some(Err(_)) => ReplCommand::Usage("preview <table> [limit]")
    }
}

/// Read commands from `input` until `quit` or end of input.
///
/// # Errors
///
/// Returns an error when reading input or writing output fails.
pub async fn run_repl<R, W>(
    engine: &SqlEngine,
    mut input: R,
    out: &mut W,
    opts: &OutputOptions,
    preview_limit: u64
) -> AppResult<()>
where
    R: BufRead,
    W: Write
{
    write_lines(out, &banner(engine))?;
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT).map_err(|e| io_error("write output", e))?;
        out.flush().map_err(|e| io_error("write output", e))?;
        line.clear();
        if input
            .read_line(&mut line)
            .map_err(|e| io_error("read input", e))?
            == 0
        {
            writeln!(out).map_err(|e| io_error("write output", e))?;
            return Ok(());
        }
        let output = match parse_line(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => return Ok(()),
            ReplCommand::Help => CommandOutput::new(0, vec![HELP.to_string()]),
            ReplCommand::Usage(usage) => {
                CommandOutput::new(1, vec![format!("Usage: {}", usage)])
            }
            ReplCommand::Tables => tables(engine, opts).await,
            ReplCommand::Preview {
                table,
                limit
            } => preview(engine, &table, limit.unwrap_or(preview_limit), opts).await,
            ReplCommand::Sql(sql) => run_sql(engine, &sql, opts).await,
            ReplCommand::Ask(question) => ask(engine, &question, opts, true).await
        };
        write_lines(out, &output.stdout)?;
    }
}

fn banner(engine: &SqlEngine) -> Vec<String> {
    let mut lines = vec![format!(
        "nl-sql {} ({} database). Type 'help' for commands.",
        env!("CARGO_PKG_VERSION"),
        engine.dialect()
    )];
    if engine.state() == EngineState::Degraded {
        lines.push(format!("{}", engine.schema_context().yellow()));
    }
    if !engine.has_ai() {
        lines.push(format!("{}", AI_UNAVAILABLE.yellow()));
    }
    lines
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> AppResult<()> {
    for line in lines {
        writeln!(out, "{}", line).map_err(|e| io_error("write output", e))?;
    }
    Ok(())
}
