//! Route registrar: binds the conventional CRUD routes of a resource onto an axum router.
//!
//! | category | method+path            | name          | action            |
//! |----------|------------------------|---------------|-------------------|
//! | read     | GET /                  | {name}-index  | functions.list    |
//! | read     | GET /{param}           | {name}-show   | functions.read    |
//! | create   | GET /create            | {name}-create | functions.create  |
//! | create   | POST /create           | {name}-store  | functions.store   |
//! | update   | GET /edit/{param}      | {name}-edit   | functions.edit    |
//! | update   | PUT /edit/{param}      | {name}-update | functions.update  |
//! | delete   | DELETE /delete/{param} | {name}-delete | functions.delete  |

use crate::config::{resolve, Functionalities, Functions, ResolvedResource, ResourceConfig};
use crate::error::ConfigError;
use crate::routes::{Controller, RouteBinding, RouteTable, Verb};
use axum::Router;
use std::collections::HashMap;

/// Routes a resolved resource expands to, in binding order.
pub fn plan_bindings(resource: &ResolvedResource) -> Vec<RouteBinding> {
    let param = resource.parameter();
    let f = &resource.functions;
    let mut planned: Vec<(Verb, String, &str, &str)> = Vec::with_capacity(7);

    if resource.enabled.read {
        planned.push((Verb::Get, resource.path(""), "index", f.list.as_str()));
        planned.push((Verb::Get, resource.path(&format!("/{}", param)), "show", f.read.as_str()));
    }
    if resource.enabled.create {
        planned.push((Verb::Get, resource.path("/create"), "create", f.create.as_str()));
        planned.push((Verb::Post, resource.path("/create"), "store", f.store.as_str()));
    }
    if resource.enabled.update {
        planned.push((Verb::Get, resource.path(&format!("/edit/{}", param)), "edit", f.edit.as_str()));
        planned.push((Verb::Put, resource.path(&format!("/edit/{}", param)), "update", f.update.as_str()));
    }
    if resource.enabled.delete {
        planned.push((Verb::Delete, resource.path(&format!("/delete/{}", param)), "delete", f.delete.as_str()));
    }

    planned
        .into_iter()
        .map(|(verb, path, suffix, action)| RouteBinding {
            verb,
            path,
            name: resource.route_name(suffix),
            controller: resource.controller.clone(),
            action: action.to_string(),
        })
        .collect()
}

/// Accumulates resources; `finish` hands back the router and the table of named routes.
#[derive(Debug)]
pub struct RouteRegistrar<S = ()> {
    router: Router<S>,
    table: RouteTable,
    controllers: HashMap<String, Controller<S>>,
}

impl<S> Default for RouteRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RouteRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::new(),
            controllers: HashMap::new(),
        }
    }

    /// Make a controller addressable by name from [`ResourceConfig::controller`].
    pub fn controller(&mut self, controller: Controller<S>) -> &mut Self {
        self.controllers.insert(controller.name().to_string(), controller);
        self
    }

    /// Register the CRUD routes of one resource. Nothing is bound when any check fails.
    pub fn register(
        &mut self,
        prefix: Option<&str>,
        controller: &Controller<S>,
        name_prefix: &str,
        parameter_name: &str,
        functionalities: &Functionalities,
        functions: &Functions,
    ) -> Result<&mut Self, ConfigError> {
        let config = ResourceConfig {
            prefix: prefix.map(str::to_string),
            controller: controller.name().to_string(),
            name_prefix: name_prefix.to_string(),
            parameter_name: parameter_name.to_string(),
            functionalities: functionalities.clone(),
            functions: functions.clone(),
        };
        let resource = resolve(&config)?;
        self.bind(&resource, controller)?;
        Ok(self)
    }

    /// Register a declared resource against a controller added with [`Self::controller`].
    pub fn resource(&mut self, config: &ResourceConfig) -> Result<&mut Self, ConfigError> {
        let resource = resolve(config)?;
        let controller = self
            .controllers
            .remove(&resource.controller)
            .ok_or_else(|| ConfigError::UnknownController(resource.controller.clone()))?;
        let bound = self.bind(&resource, &controller);
        self.controllers.insert(resource.controller.clone(), controller);
        bound?;
        Ok(self)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn finish(self) -> (Router<S>, RouteTable) {
        (self.router, self.table)
    }

    fn bind(&mut self, resource: &ResolvedResource, controller: &Controller<S>) -> Result<(), ConfigError> {
        let bindings = plan_bindings(resource);
        if let Some(missing) = bindings.iter().find(|b| !controller.has_action(&b.action)) {
            return Err(ConfigError::UnknownAction {
                controller: controller.name().to_string(),
                action: missing.action.clone(),
            });
        }
        self.table.check(&bindings)?;

        let mut router = self.router.clone();
        for binding in &bindings {
            let Some(method_router) = controller.method_router(&binding.action, binding.verb.filter()) else {
                continue;
            };
            router = router.route(&binding.axum_path(), method_router);
            tracing::debug!(
                route = %binding.name,
                method = %binding.verb,
                path = %binding.path,
                action = %binding.action,
                "bound route"
            );
        }
        self.router = router;
        for binding in bindings {
            self.table.push(binding);
        }
        tracing::info!(
            controller = %resource.controller,
            prefix = %resource.path(""),
            "registered crud resource"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_functionalities, default_functions};

    fn resource() -> ResolvedResource {
        resolve(&ResourceConfig::new("categories", "CategoryController", "categories", "category")).unwrap()
    }

    #[test]
    fn full_resource_plans_seven_routes() {
        let planned: Vec<(Verb, String, String, String)> = plan_bindings(&resource())
            .into_iter()
            .map(|b| (b.verb, b.path, b.name, b.action))
            .collect();
        let expected = [
            (Verb::Get, "/categories", "categories-index", "index"),
            (Verb::Get, "/categories/{category}", "categories-show", "show"),
            (Verb::Get, "/categories/create", "categories-create", "create"),
            (Verb::Post, "/categories/create", "categories-store", "store"),
            (Verb::Get, "/categories/edit/{category}", "categories-edit", "edit"),
            (Verb::Put, "/categories/edit/{category}", "categories-update", "update"),
            (Verb::Delete, "/categories/delete/{category}", "categories-delete", "destroy"),
        ]
        .map(|(v, p, n, a)| (v, p.to_string(), n.to_string(), a.to_string()));
        assert_eq!(planned, expected);
    }

    #[test]
    fn disabled_categories_plan_nothing() {
        let mut r = resource();
        r.enabled.create = false;
        r.enabled.update = false;
        let names: Vec<String> = plan_bindings(&r).into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["categories-index", "categories-show", "categories-delete"]);
    }

    #[test]
    fn custom_function_names_are_used() {
        let mut functions = default_functions();
        functions.insert("list".into(), "all".into());
        let config = ResourceConfig {
            functions,
            functionalities: default_functionalities(),
            ..ResourceConfig::new("tags", "TagController", "tags", "tag")
        };
        let bindings = plan_bindings(&resolve(&config).unwrap());
        assert_eq!(bindings[0].action, "all");
    }
}
