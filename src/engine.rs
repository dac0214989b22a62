//! Natural-language query engine.
//!
//! [`SqlEngine`] ties the pipeline together:
//!
//! ```text
//! question -> prompt (cached schema context) -> completion client
//!          -> extracted SQL -> executor -> EngineResponse -> formatter
//! ```
//!
//! Every public operation returns an [`EngineResponse`]; errors never escape
//! as `Err`. The original error text is kept verbatim in
//! [`EngineResponse::error`].
//!
//! # States
//!
//! The schema is introspected once, in [`SqlEngine::new`]. If that fails the
//! engine is [`EngineState::Degraded`]: natural-language queries fail fast,
//! direct SQL, previews and table listing keep working.
//!
//! # Trust boundary
//!
//! Generated SQL and caller-supplied table names are executed verbatim. There
//! is no identifier escaping, allow-listing or parameterization, so the
//! engine must only be exposed to trusted operators.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    cache::SchemaCache,
    db::{Database, SqlDialect},
    error::EngineResult,
    llm::{CompletionClient, generate_sql},
    output::format_results,
    prompt::{Prompt, build_prompt},
    query::{self, QueryResult, Value},
    schema::{TableSchema, describe_columns, introspect}
};

/// Returned by natural-language queries when no completion client is set
pub const AI_UNAVAILABLE: &str =
    "AI functionality not available. Use execute_sql_query() for direct SQL.";

/// Default row limit of [`SqlEngine::get_table_preview`]
pub const DEFAULT_PREVIEW_LIMIT: u64 = 5;

/// Outcome of [`SqlEngine::check_connection`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub version:  String,
    pub database: String,
    pub tables:   Vec<String>
}

/// Result envelope of every engine operation.
///
/// `success == false` implies `data` is absent and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResponse {
    pub success:       bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_query:     Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data:          Option<QueryResult>,
    /// Structured schema, filled by [`SqlEngine::list_tables`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables:        Option<TableSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:         Option<String>
}

impl EngineResponse {
    pub fn success(data: QueryResult) -> Self {
        Self {
            success:       true,
            sql_query:     None,
            natural_query: None,
            data:          Some(data),
            tables:        None,
            error:         None
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success:       false,
            sql_query:     None,
            natural_query: None,
            data:          None,
            tables:        None,
            error:         Some(error.into())
        }
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql_query = Some(sql.into());
        self
    }

    pub fn with_natural_query(mut self, natural_query: impl Into<String>) -> Self {
        self.natural_query = Some(natural_query.into());
        self
    }

    /// Rows returned or affected, when the operation succeeded
    pub fn row_count(&self) -> Option<u64> {
        self.data.as_ref().map(QueryResult::row_count)
    }
}

/// Lifecycle state after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Schema loaded; every operation available
    Ready,
    /// Schema introspection failed; natural-language queries disabled
    Degraded
}

/// Natural-language to SQL engine over one database
pub struct SqlEngine {
    database: Box<dyn Database>,
    client:   Option<Box<dyn CompletionClient>>,
    cache:    SchemaCache
}

impl SqlEngine {
    /// Build the engine and cache the schema context.
    ///
    /// Never fails: an introspection error leaves the engine degraded.
    /// Without a completion client natural-language queries are unavailable.
    pub async fn new(
        database: Box<dyn Database>,
        client: Option<Box<dyn CompletionClient>>
    ) -> Self {
        let cache = SchemaCache::from_result(load_schema(database.as_ref()).await);
        if client.is_none() {
            info!("no completion client configured, natural-language queries disabled");
        }
        Self {
            database,
            client,
            cache
        }
    }

    pub fn state(&self) -> EngineState {
        if self.cache.is_degraded() {
            EngineState::Degraded
        } else {
            EngineState::Ready
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.database.dialect()
    }

    /// Schema context embedded in prompts (error placeholder when degraded)
    pub fn schema_context(&self) -> &str {
        self.cache.context()
    }

    pub fn has_ai(&self) -> bool {
        self.client.is_some()
    }

    /// Prompt that would be sent for `natural_query`
    pub fn prompt_for(&self, natural_query: &str) -> Prompt {
        build_prompt(self.cache.context(), natural_query, self.dialect())
    }

    /// Translate a question to SQL with the model, then run it
    pub async fn execute_natural_query(&self, natural_query: &str) -> EngineResponse {
        let Some(client) = self.client.as_deref() else {
            warn!("natural-language query rejected: no completion client");
            return EngineResponse::failure(AI_UNAVAILABLE).with_natural_query(natural_query);
        };
        if let Some(reason) = self.cache.failure() {
            warn!("natural-language query rejected: schema unavailable");
            return EngineResponse::failure(format!(
                "Natural-language queries unavailable: schema could not be loaded ({})",
                reason
            ))
            .with_natural_query(natural_query);
        }
        let prompt = self.prompt_for(natural_query);
        match generate_sql(client, &prompt).await {
            Ok(sql) => self.execute_sql_query(&sql).await.with_natural_query(natural_query),
            Err(e) => EngineResponse::failure(format!(
                "Error processing natural language query: {}",
                e
            ))
            .with_natural_query(natural_query)
        }
    }

    /// Run SQL directly; does not need the model
    pub async fn execute_sql_query(&self, sql: &str) -> EngineResponse {
        match self.run(sql).await {
            Ok(result) => EngineResponse::success(result).with_sql(sql),
            Err(e) => EngineResponse::failure(e.to_string()).with_sql(sql)
        }
    }

    /// `SELECT * FROM <table> LIMIT <limit>`; the table name is not escaped
    pub async fn get_table_preview(&self, table: &str, limit: u64) -> EngineResponse {
        let sql = format!("SELECT * FROM {} LIMIT {}", table, limit);
        self.execute_sql_query(&sql).await
    }

    /// Tables and their columns.
    ///
    /// Served from the cache; a degraded engine introspects afresh without
    /// updating the cache.
    pub async fn list_tables(&self) -> EngineResponse {
        let schema = match self.cache.schema() {
            Some(schema) => schema.clone(),
            None => match load_schema(self.database.as_ref()).await {
                Ok(schema) => schema,
                Err(e) => return EngineResponse::failure(format!("Error listing tables: {}", e))
            }
        };
        let rows = schema
            .tables
            .iter()
            .map(|(name, columns)| {
                vec![
                    Value::Text(name.clone()),
                    Value::Text(describe_columns(columns))
                ]
            })
            .collect();
        let data = QueryResult::from_positional(
            vec![String::from("table"), String::from("columns")],
            rows
        );
        let mut response = EngineResponse::success(data);
        response.tables = Some(schema);
        response
    }

    /// Connect, read server metadata and enumerate table names, bypassing
    /// the cache
    pub async fn check_connection(&self) -> EngineResult<DatabaseInfo> {
        let mut conn = self.database.connect().await?;
        let server = conn.server_info().await?;
        let tables = conn.list_tables().await?;
        Ok(DatabaseInfo {
            version: server.version,
            database: server.database,
            tables
        })
    }

    /// Render a response as text; see [`format_results`]
    pub fn format_results(&self, response: &EngineResponse, max_rows: usize) -> String {
        format_results(response, max_rows)
    }

    async fn run(&self, sql: &str) -> EngineResult<QueryResult> {
        let mut conn = self.database.connect().await?;
        query::execute(conn.as_mut(), sql).await
    }
}

async fn load_schema(database: &dyn Database) -> EngineResult<TableSchema> {
    let mut conn = database.connect().await?;
    introspect(conn.as_mut()).await
}
