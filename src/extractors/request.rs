//! Inbound request for the dispatcher: decoded input plus what "back" needs.

use crate::error::CrudError;
use crate::service::{Fields, RuleSet};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header::{ACCEPT, CONTENT_TYPE, REFERER},
    Form, Json,
};
use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub struct CrudRequest {
    input: Fields,
    referer: Option<String>,
    wants_json: bool,
}

impl CrudRequest {
    pub fn new(input: Fields) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Mark the client as an API / XHR caller: validation failures answer 422 JSON instead of redirecting.
    pub fn expecting_json(mut self) -> Self {
        self.wants_json = true;
        self
    }

    pub fn input(&self) -> &Fields {
        &self.input
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    pub fn wants_json(&self) -> bool {
        self.wants_json
    }

    /// Input restricted to the fields named by `rules`.
    pub fn only(&self, rules: &RuleSet) -> Fields {
        crate::service::only(&self.input, rules)
    }
}

/// Reads JSON object bodies or url-encoded forms (query string for GET). Other bodies give empty input.
#[async_trait]
impl<S> FromRequest<S> for CrudRequest
where
    S: Send + Sync,
{
    type Rejection = CrudError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers();
        let referer = headers
            .get(REFERER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let wants_json = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.contains("application/json"))
            .unwrap_or(false);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let input = if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| CrudError::BadRequest(e.body_text()))?;
            match value {
                Value::Object(m) => m,
                _ => return Err(CrudError::BadRequest("body must be a JSON object".into())),
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") || req.method() == axum::http::Method::GET {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| CrudError::BadRequest(e.body_text()))?;
            pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
        } else {
            Fields::new()
        };

        Ok(Self {
            input,
            referer,
            wants_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_keeps_ruled_fields_that_were_sent() {
        let input = json!({"name": "Books", "is_admin": true});
        let request = CrudRequest::new(input.as_object().cloned().unwrap_or_default()).with_referer("/categories/create");
        let rules = RuleSet::new().with("name", "required").with("description", "nullable");

        assert_eq!(Value::Object(request.only(&rules)), json!({"name": "Books"}));
        assert_eq!(request.referer(), Some("/categories/create"));
        assert!(!request.wants_json());
    }
}
