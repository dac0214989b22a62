//! Configuration loading and management.
//!
//! Configuration is one explicit struct built at startup and handed to the
//! engine; nothing is read from global state afterwards. Sources, highest
//! precedence first:
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.nl-sql.toml` in current directory
//! 4. `~/.config/nl-sql/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [database]
//! backend = "mysql"            # mysql, sqlite
//! host = "127.0.0.1"
//! port = 3306
//! user = "reporter"
//! name = "employee"
//!
//! [llm]
//! provider = "openai"          # openai, anthropic, ollama
//! model = "gpt-4"
//! timeout_secs = 30
//!
//! [display]
//! max_rows = 20
//! preview_limit = 5
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `DB_BACKEND` | `mysql` or `sqlite` |
//! | `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` | MySQL connection |
//! | `DATABASE_URL` | Full `mysql://` URL, overrides the parts |
//! | `SQLITE_PATH` | SQLite file or `:memory:` |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_API_KEY` | API key (falls back to `OPENAI_API_KEY`) |
//! | `LLM_MODEL` | Model identifier |
//! | `LLM_ENDPOINT` | OpenAI-compatible chat-completions URL |
//! | `OLLAMA_URL` | Ollama base URL |
//! | `LLM_TIMEOUT_SECS` | Request timeout, 1 to 30 seconds |
//! | `MAX_ROWS`, `PREVIEW_LIMIT` | Display limits |

use std::{env, fs, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::{
    db::{Database, MySqlDatabase, SqliteDatabase},
    error::{EngineResult, config_error},
    llm::{GenerationOptions, LlmProvider, OPENAI_ENDPOINT}
};

/// Upper bound of a language-model request, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm:      LlmConfig,
    #[serde(default)]
    pub display:  DisplayConfig
}

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mysql,
    Sqlite
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::Mysql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown database backend '{}'", other))
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend:  Backend,
    pub host:     String,
    pub port:     u16,
    pub user:     Option<String>,
    pub password: Option<String>,
    pub name:     Option<String>,
    pub url:      Option<String>,
    pub path:     Option<String>
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend:  Backend::Mysql,
            host:     String::from("127.0.0.1"),
            port:     3306,
            user:     None,
            password: None,
            name:     None,
            url:      None,
            path:     None
        }
    }
}

/// Language-model provider names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Anthropic,
    Ollama
}

impl ProviderKind {
    /// Get default model for provider
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown LLM provider '{}'", other))
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider:     ProviderKind,
    pub api_key:      Option<String>,
    pub model:        Option<String>,
    pub endpoint:     Option<String>,
    pub ollama_url:   String,
    pub timeout_secs: u64,
    pub temperature:  f32,
    pub max_tokens:   u32
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:     ProviderKind::OpenAI,
            api_key:      None,
            model:        None,
            endpoint:     None,
            ollama_url:   String::from("http://localhost:11434"),
            timeout_secs: 30,
            temperature:  0.1,
            max_tokens:   500
        }
    }
}

/// Display limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_rows:      usize,
    pub preview_limit: u64
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_rows:      20,
            preview_limit: 5
        }
    }
}

impl Config {
    /// Load configuration from files and the process environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.nl-sql.toml)
    /// 3. Config file in home directory (~/.config/nl-sql/config.toml)
    /// 4. Default values
    pub fn load() -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("nl-sql")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".nl-sql.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &PathBuf) -> EngineResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
        check_timeout("timeout_secs", config.llm.timeout_secs)?;
        Ok(config)
    }

    /// Override settings from an environment lookup
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparseable values and for a
    /// timeout outside `1..=MAX_TIMEOUT_SECS`.
    pub fn apply_env<F>(&mut self, lookup: F) -> EngineResult<()>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(backend) = lookup("DB_BACKEND") {
            self.database.backend = backend.parse().map_err(config_error)?;
        }
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = parse_number("DB_PORT", &port)?;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = Some(user);
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = Some(name);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(path) = lookup("SQLITE_PATH") {
            self.database.path = Some(path);
        }

        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse().map_err(config_error)?;
        }
        if let Some(api_key) = lookup("LLM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm.api_key = Some(api_key);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = url;
        }
        if let Some(timeout) = lookup("LLM_TIMEOUT_SECS") {
            let secs = parse_number("LLM_TIMEOUT_SECS", &timeout)?;
            self.llm.timeout_secs = check_timeout("LLM_TIMEOUT_SECS", secs)?;
        }

        if let Some(max_rows) = lookup("MAX_ROWS") {
            self.display.max_rows = parse_number("MAX_ROWS", &max_rows)?;
        }
        if let Some(limit) = lookup("PREVIEW_LIMIT") {
            self.display.preview_limit = parse_number("PREVIEW_LIMIT", &limit)?;
        }
        Ok(())
    }

    /// Open the configured database backend.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when required settings are missing.
    pub fn open_database(&self) -> EngineResult<Box<dyn Database>> {
        let db = &self.database;
        match db.backend {
            Backend::Sqlite => {
                let path = db
                    .path
                    .as_deref()
                    .ok_or_else(|| config_error("SQLite backend requires a path (SQLITE_PATH)"))?;
                Ok(Box::new(SqliteDatabase::from_path(path)?))
            }
            Backend::Mysql => {
                if let Some(url) = &db.url {
                    return Ok(Box::new(MySqlDatabase::from_url(url)?));
                }
                let user = db
                    .user
                    .as_deref()
                    .ok_or_else(|| config_error("MySQL backend requires a user (DB_USER)"))?;
                let name = db
                    .name
                    .as_deref()
                    .ok_or_else(|| config_error("MySQL backend requires a database name (DB_NAME)"))?;
                Ok(Box::new(MySqlDatabase::new(
                    &db.host,
                    db.port,
                    user,
                    db.password.as_deref(),
                    name
                )))
            }
        }
    }

    /// Resolve the provider with its credentials.
    ///
    /// Returns `None` when a cloud provider has no API key: the engine
    /// then runs without natural-language support.
    pub fn llm_provider(&self) -> Option<LlmProvider> {
        let llm = &self.llm;
        let model = llm
            .model
            .clone()
            .unwrap_or_else(|| llm.provider.default_model().to_string());
        match llm.provider {
            ProviderKind::OpenAI => llm.api_key.clone().map(|api_key| LlmProvider::OpenAI {
                api_key,
                model,
                endpoint: llm
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| OPENAI_ENDPOINT.to_string())
            }),
            ProviderKind::Anthropic => llm.api_key.clone().map(|api_key| LlmProvider::Anthropic {
                api_key,
                model
            }),
            ProviderKind::Ollama => Some(LlmProvider::Ollama {
                base_url: llm.ollama_url.clone(),
                model
            })
        }
    }

    /// Provider with credentials, or a configuration error naming what is missing
    pub fn require_llm_provider(&self) -> EngineResult<LlmProvider> {
        self.llm_provider().ok_or_else(|| {
            config_error(format!(
                "API key required for {:?} (use --api-key or LLM_API_KEY)",
                self.llm.provider
            ))
        })
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            timeout:     Duration::from_secs(self.llm.timeout_secs),
            temperature: self.llm.temperature,
            max_tokens:  self.llm.max_tokens
        }
    }
}

fn check_timeout(key: &str, secs: u64) -> EngineResult<u64> {
    if (1..=MAX_TIMEOUT_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(config_error(format!(
            "{} must be between 1 and {} seconds, got {}",
            key, MAX_TIMEOUT_SECS, secs
        )))
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> EngineResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| config_error(format!("{} must be a number, got '{}'", key, value)))
}
