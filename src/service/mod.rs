//! Crud dispatcher, rule sets and validation.

mod crud;
mod presence;
mod rules;
mod validation;
pub use crud::{actions, Crud, CrudInvocation, ModelInstance, ModelType, Target};
pub use presence::{PgPresenceVerifier, PresenceVerifier};
pub use rules::{drop_uniqueness_rules, Clause, Rule, RuleSet};
pub use validation::{only, FieldErrors, Fields, RuleValidator, Validator};
