//! Type conversion functions for CLI to internal types.
//!
//! This module translates CLI-facing types (from the `cli` module) into the
//! configuration and output types used by the engine.

use crate::{
    cli::{Cli, Format},
    config::Config,
    output::OutputFormat
};

/// Converts a CLI format enum to the internal output format type.
///
/// # Example
///
/// ```
/// use nl_sql_engine::{app::convert_format, cli::Format, output::OutputFormat};
///
/// let format = convert_format(Format::Json);
/// assert_eq!(format, OutputFormat::Json);
/// ```
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Overlays command-line arguments on a loaded configuration.
///
/// Arguments take precedence over the environment and config files.
///
/// # Example
///
/// ```
/// use clap::Parser;
/// use nl_sql_engine::{
///     app::apply_cli,
///     cli::Cli,
///     config::{Backend, Config}
/// };
///
/// let cli = Cli::parse_from(["nl-sql", "--db-backend", "sqlite", "--sqlite-path", ":memory:", "tables"]);
/// let mut config = Config::default();
/// apply_cli(&mut config, &cli);
/// assert_eq!(config.database.backend, Backend::Sqlite);
/// assert_eq!(config.database.path.as_deref(), Some(":memory:"));
/// ```
pub fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(backend) = cli.db_backend {
        config.database.backend = backend.into();
    }
    if let Some(path) = &cli.sqlite_path {
        config.database.path = Some(path.clone());
    }
    if let Some(provider) = cli.provider {
        config.llm.provider = provider.into();
    }
    if let Some(model) = &cli.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(api_key) = &cli.api_key {
        config.llm.api_key = Some(api_key.clone());
    }
    if let Some(max_rows) = cli.max_rows {
        config.display.max_rows = max_rows;
    }
}
