//! Dispatcher outcomes: redirect with flash, or back with errors.

use crate::config::CrudSettings;
use crate::error::ErrorBody;
use crate::extractors::{encode_errors, set_cookie};
use crate::service::FieldErrors;
use axum::{
    http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Result of one CRUD dispatch.
#[derive(Clone, Debug)]
pub enum CrudOutcome {
    /// Action ran; go to the destination route with the success flash.
    Redirect {
        location: String,
        settings: Arc<CrudSettings>,
    },
    /// Validation failed; go back to the form with the errors.
    Back {
        location: String,
        errors: FieldErrors,
        wants_json: bool,
        settings: Arc<CrudSettings>,
    },
}

impl CrudOutcome {
    pub fn location(&self) -> &str {
        match self {
            CrudOutcome::Redirect { location, .. } | CrudOutcome::Back { location, .. } => location,
        }
    }

    /// Flash carried by a successful outcome, e.g. `("state", "confirmed")`.
    pub fn flash(&self) -> Option<(&str, &str)> {
        match self {
            CrudOutcome::Redirect { settings, .. } => {
                Some((settings.flash_key.as_str(), settings.flash_value.as_str()))
            }
            CrudOutcome::Back { .. } => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, CrudOutcome::Redirect { .. })
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            CrudOutcome::Back { errors, .. } => Some(errors),
            CrudOutcome::Redirect { .. } => None,
        }
    }
}

impl IntoResponse for CrudOutcome {
    fn into_response(self) -> Response {
        match self {
            CrudOutcome::Redirect { location, settings } => {
                let cookie = set_cookie(&settings.flash_key, &settings.flash_value, &settings);
                (StatusCode::SEE_OTHER, [(LOCATION, location), (SET_COOKIE, cookie)]).into_response()
            }
            CrudOutcome::Back {
                errors, wants_json: true, ..
            } => {
                let body = ErrorBody::new("validation_error", "the given data was invalid", serde_json::to_value(&errors).ok());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            CrudOutcome::Back {
                location,
                errors,
                settings,
                ..
            } => {
                let cookie = set_cookie(&settings.errors_cookie, &encode_errors(&errors), &settings);
                (StatusCode::SEE_OTHER, [(LOCATION, location), (SET_COOKIE, cookie)]).into_response()
            }
        }
    }
}
