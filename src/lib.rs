//! easy-crud: convention-driven CRUD routes and validate-invoke-redirect shortcuts for axum.

pub mod capability;
pub mod config;
pub mod error;
pub mod extractors;
pub mod install;
pub mod response;
pub mod routes;
pub mod service;

pub use capability::EasyCrud;
pub use config::{load_resources, resolve, settings_from_env, CrudSettings, ResourceConfig};
pub use error::{ConfigError, CrudError, ErrorBody, ErrorDetail, ModelError, RouteError, ValidationError};
pub use extractors::{CrudRequest, Flash};
pub use response::CrudOutcome;
pub use routes::{Controller, RouteBinding, RouteRegistrar, RouteTable, Verb};
pub use service::{
    actions, drop_uniqueness_rules, Crud, CrudInvocation, FieldErrors, Fields, ModelInstance, ModelType,
    PgPresenceVerifier, PresenceVerifier, Rule, RuleSet, RuleValidator, Target, Validator,
};
