//! Per-engine schema cache.
//!
//! Holds the introspected [`TableSchema`] and the prompt context derived from
//! it. Filled once when the engine is built and never invalidated: a schema
//! change on the server is only seen by a new engine.

use tracing::{info, warn};

use crate::{error::EngineError, schema::TableSchema};

/// Cached schema state of one engine instance
#[derive(Debug, Clone)]
pub struct SchemaCache {
    schema:  Option<TableSchema>,
    context: String,
    failure: Option<String>
}

impl SchemaCache {
    /// Cache a successfully introspected schema
    pub fn loaded(schema: TableSchema) -> Self {
        info!(tables = schema.len(), "schema context built");
        let context = schema.to_context();
        Self {
            schema: Some(schema),
            context,
            failure: None
        }
    }

    /// Record an introspection failure; the context becomes an error string
    pub fn failed(error: &EngineError) -> Self {
        warn!(error = %error, "schema introspection failed, natural-language queries disabled");
        Self {
            schema:  None,
            context: format!("Error loading schema: {}", error),
            failure: Some(error.to_string())
        }
    }

    /// Build from the outcome of an introspection attempt
    pub fn from_result(result: Result<TableSchema, EngineError>) -> Self {
        match result {
            Ok(schema) => Self::loaded(schema),
            Err(e) => Self::failed(&e)
        }
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Prompt context, or the error placeholder when introspection failed
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Introspection error message, if the cache is degraded
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}
