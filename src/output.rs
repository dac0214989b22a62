use colored::Colorize;

use crate::{
    engine::EngineResponse,
    query::{QueryResult, Row}
};

/// Default number of rows rendered in a text table
pub const DEFAULT_MAX_ROWS: usize = 20;

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:   OutputFormat,
    pub colored:  bool,
    pub max_rows: usize
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:   OutputFormat::Text,
            colored:  true,
            max_rows: DEFAULT_MAX_ROWS
        }
    }
}

/// Render a response according to output options
pub fn render(response: &EngineResponse, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(response).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(response).unwrap_or_default(),
        OutputFormat::Text => format_text(response, opts.max_rows, opts.colored)
    }
}

/// Render a response as plain text.
///
/// Failures become a single `Error:` line, write results a confirmation
/// line, row results an aligned table of at most `max_rows` rows followed by
/// a summary line.
///
/// Cells are looked up by column name. When a result repeats a column name
/// (`SELECT * FROM a JOIN b` with `id` in both), every such header shows the
/// value of the last column with that name; alias the columns to see both.
pub fn format_results(response: &EngineResponse, max_rows: usize) -> String {
    format_text(response, max_rows, false)
}

fn format_text(response: &EngineResponse, max_rows: usize, colored: bool) -> String {
    if !response.success {
        let message = response.error.as_deref().unwrap_or("Unknown error");
        return if colored {
            format!("{} {}", "Error:".red().bold(), message)
        } else {
            format!("Error: {}", message)
        };
    }
    match &response.data {
        None => String::from("No results found."),
        Some(QueryResult::Affected {
            count
        }) => {
            let line = format!("Query executed successfully. Affected rows: {}", count);
            if colored { line.green().to_string() } else { line }
        }
        Some(QueryResult::Rows {
            data, ..
        }) if data.is_empty() => String::from("No results found."),
        Some(QueryResult::Rows {
            columns,
            data
        }) => format_table(columns, data, max_rows, colored)
    }
}

fn format_table(columns: &[String], data: &[Row], max_rows: usize, colored: bool) -> String {
    let shown = &data[..data.len().min(max_rows)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(col.chars().count(), usize::max)
        })
        .collect();

    let header = join_padded(columns.iter().map(String::as_str), &widths);
    let mut lines = Vec::with_capacity(shown.len() + 2);
    lines.push(if colored { header.bold().to_string() } else { header.clone() });
    lines.push("-".repeat(header.chars().count()));
    for row in &cells {
        lines.push(join_padded(row.iter().map(String::as_str), &widths));
    }

    let mut output = lines.join("\n");
    let total = data.len();
    if total > shown.len() {
        output.push_str(&format!(
            "\n\n... showing {} of {} rows ({} omitted)",
            shown.len(),
            total,
            total - shown.len()
        ));
    } else {
        output.push_str(&format!("\n\nTotal rows: {}", total));
    }
    output
}

fn join_padded<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
}
