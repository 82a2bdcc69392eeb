//! Resolve resource declarations and load them (and dispatcher settings) from disk or env.

use crate::config::resolved::{ControllerFunctions, EnabledCategories, ResolvedResource};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::path::Path;

/// Build resolved resource from its declaration (call after validate).
pub fn resolve(config: &ResourceConfig) -> Result<ResolvedResource, ConfigError> {
    validate(config)?;
    let prefix = config.prefix.as_deref().ok_or(ConfigError::MissingPrefix)?;
    let trimmed = prefix.trim().trim_matches('/');
    let base_path = if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    };

    let enabled = |key: &str| config.functionalities.get(key).copied().unwrap_or(false);
    let function = |key: &str| config.functions.get(key).cloned().unwrap_or_default();

    Ok(ResolvedResource {
        base_path,
        controller: config.controller.clone(),
        name_prefix: config.name_prefix.clone(),
        parameter_name: config.parameter_name.clone(),
        enabled: EnabledCategories {
            create: enabled("create"),
            read: enabled("read"),
            update: enabled("update"),
            delete: enabled("delete"),
        },
        functions: ControllerFunctions {
            list: function("list"),
            read: function("read"),
            create: function("create"),
            store: function("store"),
            edit: function("edit"),
            update: function("update"),
            delete: function("delete"),
        },
    })
}

/// Read a JSON array of resource declarations.
pub async fn load_resources(path: impl AsRef<Path>) -> Result<Vec<ResourceConfig>, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_resources(&raw)
}

pub fn parse_resources(raw: &str) -> Result<Vec<ResourceConfig>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Dispatcher settings from `EASY_CRUD_*` env vars, falling back to defaults.
pub fn settings_from_env() -> CrudSettings {
    settings_from_lookup(|key| std::env::var(key).ok())
}

fn settings_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CrudSettings {
    let mut settings = CrudSettings::default();
    if let Some(v) = lookup("EASY_CRUD_FLASH_KEY") {
        settings.flash_key = v;
    }
    if let Some(v) = lookup("EASY_CRUD_FLASH_VALUE") {
        settings.flash_value = v;
    }
    if let Some(v) = lookup("EASY_CRUD_ERRORS_COOKIE") {
        settings.errors_cookie = v;
    }
    if let Some(v) = lookup("EASY_CRUD_BACK_FALLBACK") {
        settings.back_fallback = v;
    }
    if let Some(v) = lookup("EASY_CRUD_COOKIE_PATH") {
        settings.cookie_path = v;
    }
    if let Some(secs) = lookup("EASY_CRUD_FLASH_MAX_AGE").and_then(|v| v.parse().ok()) {
        settings.flash_max_age_secs = secs;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn prefix_slashes_are_normalised() {
        let mut config = ResourceConfig::new("/categories/", "CategoryController", "categories", "category");
        assert_eq!(resolve(&config).unwrap().base_path, "/categories");
        config.prefix = Some(String::new());
        let root = resolve(&config).unwrap();
        assert_eq!(root.base_path, "");
        assert_eq!(root.path(""), "/");
        assert_eq!(root.path("/create"), "/create");
    }

    #[test]
    fn omitted_maps_take_defaults() {
        let raw = r#"[{"prefix": "tags", "controller": "TagController", "name_prefix": "tags", "parameter_name": "tag"}]"#;
        let resources = parse_resources(raw).unwrap();
        let resolved = resolve(&resources[0]).unwrap();
        assert_eq!(resolved.functions.list, "index");
        assert_eq!(resolved.functions.delete, "destroy");
        assert!(resolved.enabled.create && resolved.enabled.read && resolved.enabled.update && resolved.enabled.delete);
    }

    #[test]
    fn null_prefix_in_json_is_a_config_error() {
        let raw = r#"[{"prefix": null, "controller": "TagController", "name_prefix": "tags", "parameter_name": "tag"}]"#;
        let resources = parse_resources(raw).unwrap();
        assert!(matches!(resolve(&resources[0]), Err(ConfigError::MissingPrefix)));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        assert!(matches!(parse_resources("{"), Err(ConfigError::Load(_))));
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [("EASY_CRUD_FLASH_VALUE", "saved"), ("EASY_CRUD_FLASH_MAX_AGE", "5")]
            .into_iter()
            .collect();
        let settings = settings_from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.flash_key, "state");
        assert_eq!(settings.flash_value, "saved");
        assert_eq!(settings.flash_max_age_secs, 5);
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_resources("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
