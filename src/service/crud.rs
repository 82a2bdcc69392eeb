//! Crud: validate -> invoke -> redirect.

use crate::config::CrudSettings;
use crate::error::{CrudError, ModelError, ValidationError};
use crate::extractors::CrudRequest;
use crate::response::CrudOutcome;
use crate::routes::RouteTable;
use crate::service::{Fields, RuleSet, Validator};
use async_trait::async_trait;
use std::sync::Arc;

/// Action names used by the shortcuts.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DESTROY: &str = "destroy";
    /// Accepted as a synonym of [`DESTROY`] by `EasyCrud::easy_crud`.
    pub const DELETE: &str = "delete";
}

/// Type-level operations (e.g. `create` on a model type / repository).
#[async_trait]
pub trait ModelType: Send + Sync {
    fn type_name(&self) -> &str;

    async fn invoke_static(&self, action: &str, fields: Option<Fields>) -> Result<(), ModelError>;
}

/// Operations on one existing record (e.g. `update`, `destroy`).
#[async_trait]
pub trait ModelInstance: Send + Sync {
    async fn invoke(&self, action: &str, fields: Option<Fields>) -> Result<(), ModelError>;
}

/// What the action runs on.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Static(&'a dyn ModelType),
    Instance(&'a dyn ModelInstance),
}

impl Target<'_> {
    pub async fn invoke(&self, action: &str, fields: Option<Fields>) -> Result<(), ModelError> {
        match self {
            Target::Static(model) => model.invoke_static(action, fields).await,
            Target::Instance(record) => record.invoke(action, fields).await,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Static(_) => "static",
            Target::Instance(_) => "instance",
        }
    }
}

/// One dispatch request; built per HTTP request and consumed by [`Crud::dispatch`].
pub struct CrudInvocation<'a> {
    pub caller: &'a str,
    pub request: Option<&'a CrudRequest>,
    pub rules: RuleSet,
    pub target: Target<'a>,
    pub action: &'a str,
    pub redirect_route: &'a str,
}

/// Dispatcher service; cheap to clone, meant to live in the application state.
#[derive(Clone)]
pub struct Crud {
    validator: Arc<dyn Validator>,
    routes: Arc<RouteTable>,
    settings: Arc<CrudSettings>,
}

impl Crud {
    pub fn new(validator: impl Validator + 'static, routes: RouteTable) -> Self {
        Self {
            validator: Arc::new(validator),
            routes: Arc::new(routes),
            settings: Arc::new(CrudSettings::default()),
        }
    }

    pub fn with_settings(mut self, settings: CrudSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn settings(&self) -> &CrudSettings {
        &self.settings
    }

    /// Validate the request (if any), run the action with the validated fields and redirect with the success flash.
    /// A validation failure is an `Ok` "back" outcome; model failures propagate untouched.
    pub async fn dispatch(&self, invocation: CrudInvocation<'_>) -> Result<CrudOutcome, CrudError> {
        let CrudInvocation {
            caller,
            request,
            rules,
            target,
            action,
            redirect_route,
        } = invocation;
        let location = self.routes.url_for(redirect_route, &[])?;

        let fields = match request {
            Some(request) => match self.validator.validate(caller, request.input(), &rules).await {
                Ok(fields) => fields,
                Err(ValidationError::Failed(errors)) => {
                    tracing::warn!(
                        caller,
                        action,
                        fields = ?errors.fields().collect::<Vec<_>>(),
                        "validation failed, going back"
                    );
                    return Ok(self.back(request, errors));
                }
                Err(e) => return Err(e.into()),
            },
            None => Fields::new(),
        };

        let argument = if fields.is_empty() { None } else { Some(fields) };
        target.invoke(action, argument).await?;
        tracing::info!(caller, action, target = target.kind(), redirect = redirect_route, "crud action done");

        Ok(CrudOutcome::Redirect {
            location,
            settings: self.settings.clone(),
        })
    }

    /// `create` on a model type with the rules unchanged.
    pub async fn store(
        &self,
        caller: &str,
        request: &CrudRequest,
        rules: &RuleSet,
        model: &dyn ModelType,
        redirect_route: &str,
    ) -> Result<CrudOutcome, CrudError> {
        self.dispatch(CrudInvocation {
            caller,
            request: Some(request),
            rules: rules.clone(),
            target: Target::Static(model),
            action: actions::CREATE,
            redirect_route,
        })
        .await
    }

    /// `update` on a record; uniqueness clauses are dropped from the rules.
    pub async fn update(
        &self,
        caller: &str,
        request: &CrudRequest,
        rules: &RuleSet,
        record: &dyn ModelInstance,
        redirect_route: &str,
    ) -> Result<CrudOutcome, CrudError> {
        self.dispatch(CrudInvocation {
            caller,
            request: Some(request),
            rules: rules.without_uniqueness(),
            target: Target::Instance(record),
            action: actions::UPDATE,
            redirect_route,
        })
        .await
    }

    /// `destroy` on a record: no request, no validation, no argument.
    pub async fn delete(&self, record: &dyn ModelInstance, redirect_route: &str) -> Result<CrudOutcome, CrudError> {
        self.dispatch(CrudInvocation {
            caller: "",
            request: None,
            rules: RuleSet::new(),
            target: Target::Instance(record),
            action: actions::DESTROY,
            redirect_route,
        })
        .await
    }

    fn back(&self, request: &CrudRequest, errors: crate::service::FieldErrors) -> CrudOutcome {
        CrudOutcome::Back {
            location: request
                .referer()
                .unwrap_or(&self.settings.back_fallback)
                .to_string(),
            errors,
            wants_json: request.wants_json(),
            settings: self.settings.clone(),
        }
    }
}
