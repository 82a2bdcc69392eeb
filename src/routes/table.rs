//! Named route table: what the registrar bound, and URL generation for redirects.

use crate::error::{ConfigError, RouteError};
use axum::routing::MethodFilter;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    pub(crate) fn filter(&self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bound route. `path` is a template with `{param}` placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteBinding {
    pub verb: Verb,
    pub path: String,
    pub name: String,
    pub controller: String,
    pub action: String,
}

impl RouteBinding {
    /// Path in axum 0.7 syntax (`/categories/:category`).
    pub fn axum_path(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(param) => format!(":{}", param),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|s| !s.is_empty())
}

/// Equal once every `{param}` is treated as the same segment.
fn same_shape(a: &str, b: &str) -> bool {
    let (a, b): (Vec<&str>, Vec<&str>) = (a.split('/').collect(), b.split('/').collect());
    a.len() == b.len()
        && a.iter().zip(&b).all(|(x, y)| match (placeholder(x), placeholder(y)) {
            (Some(_), Some(_)) => true,
            (None, None) => x == y,
            _ => false,
        })
}

/// Both paths reach a parameter at the same position, under the same static prefix, with different names.
fn param_clash(a: &str, b: &str) -> bool {
    for (x, y) in a.split('/').zip(b.split('/')) {
        match (placeholder(x), placeholder(y)) {
            (Some(p), Some(q)) if p != q => return true,
            (Some(_), Some(_)) => {}
            (None, None) if x == y => {}
            _ => return false,
        }
    }
    false
}

#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    bindings: Vec<RouteBinding>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RouteBinding> {
        self.by_name.get(name).map(|i| &self.bindings[*i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Fails without inserting anything if any binding clashes with the table or with another one in the batch.
    /// Paths clash when they only differ by parameter names, or when they put differently named
    /// parameters at the same position after a shared static prefix; the router rejects both.
    pub(crate) fn check(&self, batch: &[RouteBinding]) -> Result<(), ConfigError> {
        for (i, binding) in batch.iter().enumerate() {
            let earlier = &batch[..i];
            if self.contains(&binding.name) || earlier.iter().any(|b| b.name == binding.name) {
                return Err(ConfigError::DuplicateRouteName(binding.name.clone()));
            }
            let clashes = |b: &RouteBinding| {
                (b.verb == binding.verb && same_shape(&b.path, &binding.path)) || param_clash(&b.path, &binding.path)
            };
            if self.bindings.iter().any(clashes) || earlier.iter().any(clashes) {
                return Err(ConfigError::DuplicateRoute {
                    method: binding.verb.to_string(),
                    path: binding.path.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, binding: RouteBinding) {
        self.by_name.insert(binding.name.clone(), self.bindings.len());
        self.bindings.push(binding);
    }

    /// Render the path of a named route, filling `{param}` placeholders from `params`.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let binding = self
            .get(name)
            .ok_or_else(|| RouteError::NotDefined(name.to_string()))?;
        let mut segments = Vec::new();
        for segment in binding.path.split('/') {
            match placeholder(segment) {
                Some(param) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| *k == param)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| RouteError::MissingParameter {
                            name: name.to_string(),
                            param: param.to_string(),
                        })?;
                    segments.push(value.to_string());
                }
                None => segments.push(segment.to_string()),
            }
        }
        Ok(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(verb: Verb, path: &str, name: &str) -> RouteBinding {
        RouteBinding {
            verb,
            path: path.into(),
            name: name.into(),
            controller: "CategoryController".into(),
            action: "show".into(),
        }
    }

    #[test]
    fn axum_path_uses_colon_params() {
        assert_eq!(
            binding(Verb::Put, "/categories/edit/{category}", "x").axum_path(),
            "/categories/edit/:category"
        );
        assert_eq!(binding(Verb::Get, "/", "x").axum_path(), "/");
    }

    #[test]
    fn url_for_fills_parameters() {
        let mut table = RouteTable::new();
        table.push(binding(Verb::Get, "/categories", "categories-index"));
        table.push(binding(Verb::Get, "/categories/{category}", "categories-show"));

        assert_eq!(table.url_for("categories-index", &[]).unwrap(), "/categories");
        assert_eq!(
            table.url_for("categories-show", &[("category", "42")]).unwrap(),
            "/categories/42"
        );
        assert!(matches!(
            table.url_for("categories-show", &[]),
            Err(RouteError::MissingParameter { .. })
        ));
        assert!(matches!(table.url_for("tags-index", &[]), Err(RouteError::NotDefined(_))));
    }

    #[test]
    fn check_rejects_duplicates_within_batch_and_table() {
        let mut table = RouteTable::new();
        table.push(binding(Verb::Get, "/categories", "categories-index"));

        let same_name = [binding(Verb::Get, "/other", "categories-index")];
        assert!(matches!(table.check(&same_name), Err(ConfigError::DuplicateRouteName(_))));

        let same_route = [binding(Verb::Get, "/categories", "other-index")];
        assert!(matches!(table.check(&same_route), Err(ConfigError::DuplicateRoute { .. })));

        let batch = [
            binding(Verb::Get, "/tags", "tags-index"),
            binding(Verb::Post, "/tags", "tags-index"),
        ];
        assert!(table.check(&batch).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn parameter_names_do_not_hide_conflicts() {
        let mut table = RouteTable::new();
        table.push(binding(Verb::Put, "/categories/edit/{category}", "categories-update"));
        table.push(binding(Verb::Get, "/categories/{category}", "categories-show"));

        let renamed = [binding(Verb::Put, "/categories/edit/{id}", "cats-update")];
        assert!(matches!(table.check(&renamed), Err(ConfigError::DuplicateRoute { .. })));

        let other_verb = [binding(Verb::Get, "/categories/edit/{id}", "cats-edit")];
        assert!(matches!(table.check(&other_verb), Err(ConfigError::DuplicateRoute { .. })));

        let deeper = [binding(Verb::Get, "/categories/{id}/posts", "posts-index")];
        assert!(table.check(&deeper).is_err());

        let same_param = [binding(Verb::Delete, "/categories/delete/{category}", "categories-delete")];
        assert!(table.check(&same_param).is_ok());
        let static_sibling = [binding(Verb::Get, "/categories/create", "categories-create")];
        assert!(table.check(&static_sibling).is_ok());
    }
}
