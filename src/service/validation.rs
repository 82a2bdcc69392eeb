//! Request validation from rule sets.

use crate::error::ValidationError;
use crate::service::presence::PresenceVerifier;
use crate::service::rules::{Clause, RuleSet};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Request input / validated data: field name -> value.
pub type Fields = Map<String, Value>;

/// Field -> messages, in the shape flashed back to forms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// First message for a field, for inline form hints.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Validates request input against a rule set on behalf of `caller`.
/// Returns the validated subset: input restricted to the fields named by the rules.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, caller: &str, input: &Fields, rules: &RuleSet) -> Result<Fields, ValidationError>;
}

/// Default validator understanding the common clauses; `unique` needs a presence verifier.
#[derive(Clone, Default)]
pub struct RuleValidator {
    presence: Option<Arc<dyn PresenceVerifier>>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presence(mut self, verifier: impl PresenceVerifier + 'static) -> Self {
        self.presence = Some(Arc::new(verifier));
        self
    }

    async fn check_field(
        &self,
        field: &str,
        value: Option<&Value>,
        clauses: &[Clause],
        errors: &mut FieldErrors,
    ) -> Result<(), ValidationError> {
        let label = field.replace('_', " ");
        let present = value.map(is_filled).unwrap_or(false);
        if !present {
            if clauses.contains(&Clause::Required) {
                errors.add(field, format!("The {} field is required.", label));
            }
            return Ok(());
        }
        let Some(v) = value else {
            return Ok(());
        };
        let numeric = clauses.iter().any(|c| matches!(c, Clause::Numeric | Clause::Integer));

        for clause in clauses {
            match clause {
                Clause::Required | Clause::Nullable => {}
                Clause::String => {
                    if !v.is_string() {
                        errors.add(field, format!("The {} must be a string.", label));
                    }
                }
                Clause::Integer => {
                    if as_integer(v).is_none() {
                        errors.add(field, format!("The {} must be an integer.", label));
                    }
                }
                Clause::Numeric => {
                    if as_number(v).is_none() {
                        errors.add(field, format!("The {} must be a number.", label));
                    }
                }
                Clause::Boolean => {
                    if !is_boolean(v) {
                        errors.add(field, format!("The {} field must be true or false.", label));
                    }
                }
                Clause::Email => {
                    let ok = v
                        .as_str()
                        .and_then(|s| s.split_once('@'))
                        .map(|(user, domain)| !user.is_empty() && !domain.is_empty() && !domain.contains('@'))
                        .unwrap_or(false);
                    if !ok {
                        errors.add(field, format!("The {} must be a valid email address.", label));
                    }
                }
                Clause::Uuid => {
                    if v.as_str().map(|s| uuid::Uuid::parse_str(s).is_err()).unwrap_or(true) {
                        errors.add(field, format!("The {} must be a valid UUID.", label));
                    }
                }
                Clause::Min(min) => {
                    if let Some((size, unit)) = size_of(v, numeric) {
                        if size < *min {
                            errors.add(field, format!("The {} must be at least {}{}.", label, min, unit));
                        }
                    }
                }
                Clause::Max(max) => {
                    if let Some((size, unit)) = size_of(v, numeric) {
                        if size > *max {
                            errors.add(field, format!("The {} may not be greater than {}{}.", label, max, unit));
                        }
                    }
                }
                Clause::In(allowed) => {
                    if !allowed.iter().any(|a| scalar_text(v).as_deref() == Some(a.as_str())) {
                        errors.add(field, format!("The selected {} is invalid.", label));
                    }
                }
                Clause::Regex(pattern) => {
                    let re = Regex::new(pattern).map_err(|_| ValidationError::InvalidRule {
                        field: field.to_string(),
                        message: format!("invalid pattern {}", pattern),
                    })?;
                    if !v.as_str().map(|s| re.is_match(s)).unwrap_or(false) {
                        errors.add(field, format!("The {} format is invalid.", label));
                    }
                }
                Clause::Unique { table, column } => {
                    let verifier = self.presence.as_ref().ok_or_else(|| {
                        ValidationError::Presence(format!("no presence verifier configured for unique:{},{}", table, column))
                    })?;
                    if verifier.count(table, column, v).await? > 0 {
                        errors.add(field, format!("The {} has already been taken.", label));
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Validator for RuleValidator {
    async fn validate(&self, caller: &str, input: &Fields, rules: &RuleSet) -> Result<Fields, ValidationError> {
        let mut errors = FieldErrors::new();
        for (field, rule) in rules.iter() {
            let clauses = rule
                .clauses()
                .into_iter()
                .map(|c| {
                    c.parse::<Clause>().map_err(|message| ValidationError::InvalidRule {
                        field: field.to_string(),
                        message,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.check_field(field, input.get(field), &clauses, &mut errors).await?;
        }
        if !errors.is_empty() {
            tracing::debug!(caller, fields = ?errors.fields().collect::<Vec<_>>(), "validation failed");
            return Err(ValidationError::Failed(errors));
        }
        Ok(only(input, rules))
    }
}

/// Input restricted to the rule fields it actually carries.
pub fn only(input: &Fields, rules: &RuleSet) -> Fields {
    rules
        .fields()
        .filter_map(|f| input.get(f).map(|v| (f.to_string(), v.clone())))
        .collect()
}

fn is_filled(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        _ => true,
    }
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_boolean(v: &Value) -> bool {
    match v {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0) | Some(1)),
        Value::String(s) => matches!(s.as_str(), "0" | "1"),
        _ => false,
    }
}

/// Size used by min/max plus the unit suffix of the message.
fn size_of(v: &Value, numeric: bool) -> Option<(f64, &'static str)> {
    match v {
        _ if numeric => as_number(v).map(|n| (n, "")),
        Value::Number(n) => n.as_f64().map(|n| (n, "")),
        Value::String(s) => Some((s.chars().count() as f64, " characters")),
        Value::Array(a) => Some((a.len() as f64, " items")),
        _ => None,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Fields {
        match value {
            Value::Object(m) => m,
            _ => Fields::new(),
        }
    }

    struct Taken;

    #[async_trait]
    impl PresenceVerifier for Taken {
        async fn count(&self, _table: &str, _column: &str, _value: &Value) -> Result<u64, ValidationError> {
            Ok(1)
        }
    }

    #[tokio::test]
    async fn returns_only_ruled_fields() {
        let rules = RuleSet::new().with("name", "required|string").with("note", "nullable");
        let data = input(json!({"name": "Books", "is_admin": true}));
        let validated = RuleValidator::new().validate("test", &data, &rules).await.unwrap();
        assert_eq!(Value::Object(validated), json!({"name": "Books"}));
    }

    #[tokio::test]
    async fn missing_required_field_fails_with_that_field() {
        let rules = RuleSet::new().with("name", "required|max:10");
        let err = RuleValidator::new()
            .validate("test", &input(json!({"name": "  "})), &rules)
            .await
            .unwrap_err();
        match err {
            ValidationError::Failed(errors) => {
                assert_eq!(errors.first("name"), Some("The name field is required."));
                assert_eq!(errors.get("name").map(<[String]>::len), Some(1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn optional_absent_fields_skip_other_clauses() {
        let rules = RuleSet::new().with("age", "nullable|integer|min:18");
        let validated = RuleValidator::new().validate("test", &Fields::new(), &rules).await.unwrap();
        assert!(validated.is_empty());
    }

    #[tokio::test]
    async fn type_and_size_clauses() {
        let rules = RuleSet::new()
            .with("age", "integer|min:18")
            .with("title", "string|max:5")
            .with("email", "email")
            .with("status", "in:draft,published")
            .with("slug", vec!["regex:/^[a-z-]+$/"])
            .with("active", "boolean");
        let data = input(json!({
            "age": "17",
            "title": "Too long",
            "email": "nope",
            "status": "archived",
            "slug": "Bad Slug",
            "active": "yes"
        }));
        let Err(ValidationError::Failed(errors)) = RuleValidator::new().validate("test", &data, &rules).await else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.first("age"), Some("The age must be at least 18."));
        assert_eq!(errors.first("title"), Some("The title may not be greater than 5 characters."));
        assert!(errors.contains("email"));
        assert!(errors.contains("status"));
        assert!(errors.contains("slug"));
        assert!(errors.contains("active"));
    }

    #[tokio::test]
    async fn form_strings_pass_numeric_rules() {
        let rules = RuleSet::new().with("age", "required|integer|min:18").with("active", "boolean");
        let data = input(json!({"age": "21", "active": "1"}));
        assert!(RuleValidator::new().validate("test", &data, &rules).await.is_ok());
    }

    #[tokio::test]
    async fn unique_uses_the_presence_verifier() {
        let rules = RuleSet::new().with("name", "required|unique:categories,name");
        let data = input(json!({"name": "Books"}));

        let err = RuleValidator::new().validate("test", &data, &rules).await.unwrap_err();
        assert!(matches!(err, ValidationError::Presence(_)));

        let err = RuleValidator::new()
            .with_presence(Taken)
            .validate("test", &data, &rules)
            .await
            .unwrap_err();
        let ValidationError::Failed(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.first("name"), Some("The name has already been taken."));
    }

    #[tokio::test]
    async fn unknown_clause_is_a_rule_error() {
        let rules = RuleSet::new().with("name", "required|sparkly");
        let err = RuleValidator::new()
            .validate("test", &input(json!({"name": "x"})), &rules)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRule { .. }));
    }
}
