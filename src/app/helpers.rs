//! Helper functions for CLI operations.
//!
//! Engine construction from configuration, output option handling, exit
//! codes and the progress spinner shown while the model is working.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::{convert::convert_format, types::CheckReport};
use crate::{
    cli::Format,
    config::Config,
    engine::{EngineResponse, SqlEngine},
    error::AppResult,
    llm::{CompletionClient, LlmClient},
    output::{OutputFormat, OutputOptions}
};

/// Builds the engine described by a configuration.
///
/// With `require_ai` set a missing API key is an error; otherwise the engine
/// is built without natural-language support.
///
/// # Errors
///
/// Returns an error when the database settings are incomplete, or when
/// `require_ai` is set and no provider credentials are configured.
pub async fn build_engine(config: &Config, require_ai: bool) -> AppResult<SqlEngine> {
    let database = config.open_database()?;
    let provider = if require_ai {
        Some(config.require_llm_provider()?)
    } else {
        config.llm_provider()
    };
    let client = match provider {
        Some(provider) => {
            debug!(model = provider.model(), "completion client configured");
            let client = LlmClient::new(provider, config.generation_options())?;
            Some(Box::new(client) as Box<dyn CompletionClient>)
        }
        None => None
    };
    Ok(SqlEngine::new(database, client).await)
}

/// Creates output options from CLI flags and display settings.
///
/// # Example
///
/// ```
/// use nl_sql_engine::{app::create_output_options, cli::Format, output::OutputFormat};
///
/// let opts = create_output_options(Format::Json, true, 10);
/// assert_eq!(opts.format, OutputFormat::Json);
/// assert!(!opts.colored);
/// assert_eq!(opts.max_rows, 10);
/// ```
pub fn create_output_options(format: Format, no_color: bool, max_rows: usize) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        max_rows
    }
}

/// `0` for a successful response, `1` otherwise
pub fn exit_code_for(response: &EngineResponse) -> i32 {
    if response.success { 0 } else { 1 }
}

/// Renders the result of a connection check
pub fn render_check(report: &CheckReport, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(report).unwrap_or_default(),
        OutputFormat::Text => match &report.error {
            Some(error) => format!("Error: {}", error),
            None => {
                let mut lines = vec![format!(
                    "Connected to {} database, {} tables",
                    report.dialect,
                    report.tables.len()
                )];
                if let Some(version) = &report.version {
                    lines.push(format!("Server version: {}", version));
                }
                if let Some(database) = &report.database {
                    lines.push(format!("Current database: {}", database));
                }
                lines.extend(report.tables.iter().map(|t| format!("  {}", t)));
                lines.join("\n")
            }
        }
    }
}

/// Spinner on stderr for text output; hidden otherwise
pub fn start_spinner(opts: &OutputOptions, message: &str) -> ProgressBar {
    if opts.format != OutputFormat::Text {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::SqlDialect, engine::DatabaseInfo, query::QueryResult};

    #[test]
    fn test_exit_code_success() {
        let response = EngineResponse::success(QueryResult::Affected {
            count: 1
        });
        assert_eq!(exit_code_for(&response), 0);
    }

    #[test]
    fn test_exit_code_failure() {
        assert_eq!(exit_code_for(&EngineResponse::failure("boom")), 1);
    }

    #[test]
    fn test_create_output_options_colored() {
        let opts = create_output_options(Format::Text, false, 20);
        assert_eq!(opts.format, OutputFormat::Text);
        assert!(opts.colored);
    }

    #[test]
    fn test_render_check_text() {
        let info = DatabaseInfo {
            version:  "8.0.36".to_string(),
            database: "shop".to_string(),
            tables:   vec!["orders".to_string(), "users".to_string()]
        };
        let report = CheckReport::connected(SqlDialect::MySQL, info);
        let text = render_check(&report, &OutputOptions::default());
        assert_eq!(
            text,
            "Connected to MySQL database, 2 tables\n\
             Server version: 8.0.36\n\
             Current database: shop\n  orders\n  users"
        );
    }

    #[test]
    fn test_render_check_error() {
        let report = CheckReport::failed(SqlDialect::MySQL, "Connection error: refused");
        let text = render_check(&report, &OutputOptions::default());
        assert_eq!(text, "Error: Connection error: refused");
    }

    #[test]
    fn test_render_check_yaml() {
        let info = DatabaseInfo {
            version:  "3.46.0".to_string(),
            database: "main".to_string(),
            tables:   Vec::new()
        };
        let report = CheckReport::connected(SqlDialect::SQLite, info);
        let opts = OutputOptions {
            format: OutputFormat::Yaml,
            ..Default::default()
        };
        let yaml = render_check(&report, &opts);
        assert!(yaml.contains("connected: true"));
        assert!(yaml.contains("version:"));
        assert!(yaml.contains("3.46.0"));
    }

    #[tokio::test]
    async fn test_build_engine_without_key_has_no_ai() {
        let mut config = Config::default();
        config.database.backend = crate::config::Backend::Sqlite;
        config.database.path = Some(":memory:".to_string());
        let engine = build_engine(&config, false).await.unwrap();
        assert!(!engine.has_ai());
    }

    #[tokio::test]
    async fn test_build_engine_requires_key() {
        let mut config = Config::default();
        config.database.backend = crate::config::Backend::Sqlite;
        config.database.path = Some(":memory:".to_string());
        assert!(build_engine(&config, true).await.is_err());
    }
}
