//! Resolved resource: config validated and flattened for route planning.

/// Which functionality categories get routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnabledCategories {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

/// Controller action backing each endpoint kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerFunctions {
    pub list: String,
    pub read: String,
    pub create: String,
    pub store: String,
    pub edit: String,
    pub update: String,
    pub delete: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    /// Base path: `/categories`, or empty for a root resource.
    pub base_path: String,
    pub controller: String,
    pub name_prefix: String,
    pub parameter_name: String,
    pub enabled: EnabledCategories,
    pub functions: ControllerFunctions,
}

impl ResolvedResource {
    /// Path template relative to the base, e.g. `/edit/{category}`.
    pub fn path(&self, suffix: &str) -> String {
        match (self.base_path.is_empty(), suffix.is_empty()) {
            (true, true) => "/".to_string(),
            (_, true) => self.base_path.clone(),
            _ => format!("{}{}", self.base_path, suffix),
        }
    }

    pub fn parameter(&self) -> String {
        format!("{{{}}}", self.parameter_name)
    }

    pub fn route_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.name_prefix, suffix)
    }
}
