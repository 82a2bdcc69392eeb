//! Raw config types matching the JSON resource declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys every functionalities map must carry.
pub const FUNCTIONALITY_KEYS: [&str; 4] = ["create", "read", "update", "delete"];

/// Keys every functions map must carry.
pub const FUNCTION_KEYS: [&str; 7] = ["list", "read", "create", "store", "edit", "update", "delete"];

/// Functionality category -> enabled.
pub type Functionalities = BTreeMap<String, bool>;

/// Endpoint kind -> controller action name.
pub type Functions = BTreeMap<String, String>;

/// Every category enabled.
pub fn default_functionalities() -> Functionalities {
    FUNCTIONALITY_KEYS
        .iter()
        .map(|k| ((*k).to_string(), true))
        .collect()
}

/// Conventional action names: index, show, create, store, edit, update, destroy.
pub fn default_functions() -> Functions {
    [
        ("list", "index"),
        ("read", "show"),
        ("create", "create"),
        ("store", "store"),
        ("edit", "edit"),
        ("update", "update"),
        ("delete", "destroy"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// One resource declaration, e.g.
/// `{"prefix": "categories", "controller": "CategoryController", "name_prefix": "categories", "parameter_name": "category"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Path prefix; `None` (or JSON `null`) is rejected at registration.
    #[serde(default)]
    pub prefix: Option<String>,
    pub controller: String,
    pub name_prefix: String,
    pub parameter_name: String,
    #[serde(default = "default_functionalities")]
    pub functionalities: Functionalities,
    #[serde(default = "default_functions")]
    pub functions: Functions,
}

impl ResourceConfig {
    /// Declaration with default functionalities and functions.
    pub fn new(
        prefix: impl Into<String>,
        controller: impl Into<String>,
        name_prefix: impl Into<String>,
        parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            controller: controller.into(),
            name_prefix: name_prefix.into(),
            parameter_name: parameter_name.into(),
            functionalities: default_functionalities(),
            functions: default_functions(),
        }
    }
}

/// Flash and redirect settings used by the dispatcher.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrudSettings {
    /// Flash key set on success; also the cookie name.
    pub flash_key: String,
    pub flash_value: String,
    /// Cookie carrying the flashed field errors on "back".
    pub errors_cookie: String,
    /// Where "back" goes when the request had no Referer.
    pub back_fallback: String,
    pub cookie_path: String,
    pub flash_max_age_secs: u64,
}

impl Default for CrudSettings {
    fn default() -> Self {
        Self {
            flash_key: "state".into(),
            flash_value: "confirmed".into(),
            errors_cookie: "easy_crud_errors".into(),
            back_fallback: "/".into(),
            cookie_path: "/".into(),
            flash_max_age_secs: 60,
        }
    }
}
