use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Backend, ProviderKind};

/// nl-sql - Ask questions of a SQL database in plain language
#[derive(Parser, Debug)]
#[command(name = "nl-sql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "text", global = true)]
    pub output_format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Maximum rows shown in a result table
    #[arg(long, global = true)]
    pub max_rows: Option<usize>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM provider to use
    #[arg(short, long, value_enum, global = true)]
    pub provider: Option<Provider>,

    /// Model name
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// API key for OpenAI or Anthropic
    #[arg(short, long, env = "LLM_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Database backend
    #[arg(long, value_enum, global = true)]
    pub db_backend: Option<DbBackend>,

    /// SQLite database file (or :memory:)
    #[arg(long, global = true)]
    pub sqlite_path: Option<String>
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a question to SQL and run it
    Ask {
        /// Question in natural language
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Print the generated SQL before the results
        #[arg(long)]
        show_sql: bool
    },
    /// Run a SQL statement directly
    Sql {
        /// Statement to execute
        #[arg(required = true, num_args = 1..)]
        statement: Vec<String>
    },
    /// Show the first rows of a table
    Preview {
        /// Table name
        table: String,

        /// Number of rows
        #[arg(short, long)]
        limit: Option<u64>
    },
    /// List tables and their columns
    Tables,
    /// Check the database connection
    Check,
    /// Interactive question loop (default)
    Interactive
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        ProviderKind::from(*self).default_model()
    }
}

impl From<Provider> for ProviderKind {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::OpenAI => Self::OpenAI,
            Provider::Anthropic => Self::Anthropic,
            Provider::Ollama => Self::Ollama
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DbBackend {
    Mysql,
    Sqlite
}

impl From<DbBackend> for Backend {
    fn from(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Mysql => Self::Mysql,
            DbBackend::Sqlite => Self::Sqlite
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
