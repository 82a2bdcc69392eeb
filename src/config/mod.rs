//! Resource declarations: keys, defaults, validation and resolution into routable form.

mod loader;
mod resolved;
mod types;
mod validator;

pub use loader::{load_resources, parse_resources, resolve, settings_from_env};
pub use resolved::{ControllerFunctions, EnabledCategories, ResolvedResource};
pub use types::{
    default_functionalities, default_functions, CrudSettings, Functionalities, Functions, ResourceConfig,
    FUNCTIONALITY_KEYS, FUNCTION_KEYS,
};
pub use validator::{validate, validate_functionalities, validate_functions};
