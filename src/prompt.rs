//! Chat prompt construction for SQL generation.

use serde::Serialize;

use crate::db::SqlDialect;

/// Natural-language question of the built-in one-shot example
pub const EXAMPLE_QUESTION: &str = "How many users are there?";

/// SQL answer of the built-in one-shot example
pub const EXAMPLE_SQL: &str = "SELECT COUNT(*) AS user_count FROM users";

/// System and user instructions of one completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user:   String
}

/// Assemble the prompt for one natural-language question.
///
/// The system message carries the fixed output rules, the schema context and
/// a one-shot example; the user message carries the question.
pub fn build_prompt(schema_context: &str, natural_query: &str, dialect: SqlDialect) -> Prompt {
    let system = format!(
        "You are a {dialect} expert. Convert natural language queries to SQL.\n\n\
         {schema}\n\n\
         Rules:\n\
         1. Return ONLY the SQL query, no explanations\n\
         2. Use proper {dialect} syntax\n\
         3. Table and column names are case sensitive; use them exactly as shown above\n\
         4. If the query is unclear, make reasonable assumptions based on the schema\n\
         5. For aggregations, include appropriate GROUP BY clauses\n\
         6. Use explicit JOIN clauses when querying multiple tables\n\
         7. Use LIMIT for large result sets when appropriate\n\n\
         Example:\n\
         Natural: \"{question}\"\n\
         SQL: {sql}\n",
        dialect = dialect.name(),
        schema = schema_context,
        question = EXAMPLE_QUESTION,
        sql = EXAMPLE_SQL
    );
    Prompt {
        system,
        user: format!("Convert this to SQL: {}", natural_query.trim())
    }
}
