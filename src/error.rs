//! Typed errors and HTTP mapping.

use crate::service::FieldErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fatal registration-time errors. There is no recovery path: the caller must fix the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("the functionalities map must include the \"create\", \"read\", \"update\", \"delete\" elements (missing: {0:?})")]
    MissingFunctionality(Vec<&'static str>),
    #[error("the functions map must include the \"list\", \"read\", \"create\", \"store\", \"edit\", \"update\", \"delete\" elements (missing: {0:?})")]
    MissingFunction(Vec<&'static str>),
    #[error("the prefix cannot be null")]
    MissingPrefix,
    #[error("the {0} cannot be empty")]
    Empty(&'static str),
    #[error("controller {0} is not registered")]
    UnknownController(String),
    #[error("controller {controller} has no action '{action}'")]
    UnknownAction { controller: String, action: String },
    #[error("duplicate route name: {0}")]
    DuplicateRouteName(String),
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { method: String, path: String },
    #[error("config load: {0}")]
    Load(String),
}

/// Named-route lookup failures (URL generation for redirects).
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("route [{0}] not defined")]
    NotDefined(String),
    #[error("missing parameter '{param}' for route [{name}]")]
    MissingParameter { name: String, param: String },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    /// Expected outcome: the request data broke at least one rule.
    #[error("the given data was invalid")]
    Failed(FieldErrors),
    #[error("invalid rule for {field}: {message}")]
    InvalidRule { field: String, message: String },
    #[error("presence verification: {0}")]
    Presence(String),
}

/// Failure of the model operation itself. Never caught by the dispatcher.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("operation '{action}' is not supported by {model}")]
    UnsupportedAction { model: String, action: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum CrudError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("model: {0}")]
    Model(#[from] ModelError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details,
            },
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            CrudError::Route(_) => (StatusCode::INTERNAL_SERVER_ERROR, "route_error"),
            CrudError::Validation(ValidationError::Failed(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
            }
            CrudError::Validation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "rule_error"),
            CrudError::Model(ModelError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            CrudError::Model(_) => (StatusCode::INTERNAL_SERVER_ERROR, "model_error"),
            CrudError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let details = match &self {
            CrudError::Validation(ValidationError::Failed(errors)) => serde_json::to_value(errors).ok(),
            _ => None,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "crud request failed");
        }
        (status, Json(ErrorBody::new(code, self.to_string(), details))).into_response()
    }
}
