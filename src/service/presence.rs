//! Presence verification for `unique:<table>,<column>` clauses.

use crate::error::ValidationError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

#[async_trait]
pub trait PresenceVerifier: Send + Sync {
    /// Number of rows in `table` whose `column` equals `value`.
    async fn count(&self, table: &str, column: &str, value: &Value) -> Result<u64, ValidationError>;
}

/// Counts matching rows in PostgreSQL; comparison is done on the text form of the column.
#[derive(Clone)]
pub struct PgPresenceVerifier {
    pool: PgPool,
    schema: Option<String>,
}

impl PgPresenceVerifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, schema: None }
    }

    /// Look tables up in `schema` instead of the search path.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    fn table_ref(&self, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quoted(schema), quoted(table)),
            None => quoted(table),
        }
    }
}

/// Double-quoted identifier with escaped quotes.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn bind_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl PresenceVerifier for PgPresenceVerifier {
    async fn count(&self, table: &str, column: &str, value: &Value) -> Result<u64, ValidationError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}::text = $1",
            self.table_ref(table),
            quoted(column)
        );
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(bind_text(value))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ValidationError::Presence(e.to_string()))?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quoted("categories"), "\"categories\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }

    #[tokio::test]
    async fn schema_qualifies_the_table() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/easy_crud")
            .unwrap();
        let verifier = PgPresenceVerifier::new(pool);
        assert_eq!(verifier.table_ref("categories"), "\"categories\"");
        let verifier = verifier.in_schema("shop");
        assert_eq!(verifier.table_ref("categories"), "\"shop\".\"categories\"");
    }

    #[test]
    fn values_bind_as_text() {
        assert_eq!(bind_text(&json!("Books")), "Books");
        assert_eq!(bind_text(&json!(42)), "42");
        assert_eq!(bind_text(&json!(true)), "true");
    }
}
