//! Config validation: required keys and identifiers, checked before anything is bound.

use crate::config::{Functionalities, Functions, ResourceConfig, FUNCTIONALITY_KEYS, FUNCTION_KEYS};
use crate::error::ConfigError;

pub fn validate_functionalities(functionalities: &Functionalities) -> Result<(), ConfigError> {
    let missing: Vec<&'static str> = FUNCTIONALITY_KEYS
        .into_iter()
        .filter(|k| !functionalities.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingFunctionality(missing));
    }
    Ok(())
}

pub fn validate_functions(functions: &Functions) -> Result<(), ConfigError> {
    let missing: Vec<&'static str> = FUNCTION_KEYS
        .into_iter()
        .filter(|k| !functions.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingFunction(missing));
    }
    Ok(())
}

pub fn validate(config: &ResourceConfig) -> Result<(), ConfigError> {
    validate_functionalities(&config.functionalities)?;
    validate_functions(&config.functions)?;
    if config.prefix.is_none() {
        return Err(ConfigError::MissingPrefix);
    }
    for (what, value) in [
        ("controller", &config.controller),
        ("name_prefix", &config.name_prefix),
        ("parameter_name", &config.parameter_name),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Empty(what));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> ResourceConfig {
        ResourceConfig::new("categories", "CategoryController", "categories", "category")
    }

    #[test]
    fn full_config_is_valid() {
        assert!(validate(&categories()).is_ok());
    }

    #[test]
    fn every_missing_functionality_is_reported() {
        for key in FUNCTIONALITY_KEYS {
            let mut config = categories();
            config.functionalities.remove(key);
            match validate(&config) {
                Err(ConfigError::MissingFunctionality(missing)) => assert_eq!(missing, vec![key]),
                other => panic!("expected missing functionality for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn every_missing_function_is_reported() {
        for key in FUNCTION_KEYS {
            let mut config = categories();
            config.functions.remove(key);
            match validate(&config) {
                Err(ConfigError::MissingFunction(missing)) => assert_eq!(missing, vec![key]),
                other => panic!("expected missing function for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn null_prefix_is_rejected_but_empty_prefix_is_not() {
        let mut config = categories();
        config.prefix = None;
        assert!(matches!(validate(&config), Err(ConfigError::MissingPrefix)));
        config.prefix = Some(String::new());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        let mut config = categories();
        config.parameter_name = "  ".into();
        assert!(matches!(validate(&config), Err(ConfigError::Empty("parameter_name"))));
    }

    #[test]
    fn disabled_categories_still_need_their_keys() {
        let mut config = categories();
        config.functionalities.insert("delete".into(), false);
        config.functions.remove("delete");
        assert!(matches!(validate(&config), Err(ConfigError::MissingFunction(_))));
    }
}
