//! # nl-sql engine
//!
//! Ask questions of a relational database in plain language.
//!
//! The engine introspects the database schema once, turns it into a compact
//! text context, embeds that context in a prompt to a language model, pulls
//! the SQL statement out of the model's reply, executes it and returns a
//! uniform [`EngineResponse`](engine::EngineResponse). Direct SQL, table
//! previews and table listing work without a model.
//!
//! # Architecture
//!
//! ```text
//! question
//!   -> prompt::build_prompt   (cached schema context, dialect, rules)
//!   -> llm::generate_sql      (CompletionClient, extract_sql)
//!   -> query::execute         (read rows / affected count)
//!   -> engine::EngineResponse
//!   -> output::format_results
//! ```
//!
//! # Quick Start
//!
//! ```bash
//! # SQLite file, direct SQL
//! nl-sql --db-backend sqlite --sqlite-path shop.db sql "SELECT * FROM orders"
//!
//! # MySQL, natural language
//! export DB_USER=reporter DB_NAME=employee LLM_API_KEY="sk-..."
//! nl-sql ask --show-sql "How many employees joined in 2023?"
//!
//! # Interactive loop
//! nl-sql
//! ```
//!
//! # Library use
//!
//! ```no_run
//! use nl_sql_engine::{db::SqliteDatabase, engine::SqlEngine};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = SqliteDatabase::open("shop.db");
//! let engine = SqlEngine::new(Box::new(db), None).await;
//! let response = engine.execute_sql_query("SELECT COUNT(*) FROM orders").await;
//! println!("{}", engine.format_results(&response, 20));
//! # Ok(())
//! # }
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Command succeeded
//! - `1` - Engine reported a failure, or configuration was invalid
//!
//! # Modules
//!
//! - [`engine`] - Facade and response envelope
//! - [`db`] - Database and connection traits, MySQL and SQLite backends
//! - [`schema`] - Schema introspection and prompt context
//! - [`prompt`] - Prompt construction
//! - [`llm`] - Completion clients (OpenAI, Anthropic, Ollama) and SQL extraction
//! - [`query`] - Statement classification and execution
//! - [`output`] - Result formatting
//! - [`cache`] - Per-engine schema cache
//! - [`config`] - Configuration loading
//! - [`cli`], [`app`] - Command-line interface
//! - [`error`] - Error types and constructors

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod llm;
pub mod output;
pub mod prompt;
pub mod query;
pub mod schema;
