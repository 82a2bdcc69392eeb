//! Controller: a named set of axum handlers addressed by action name.

use axum::handler::Handler;
use axum::routing::{on, MethodFilter, MethodRouter};
use std::collections::HashMap;
use std::fmt;

type ActionRoute<S> = Box<dyn Fn(MethodFilter) -> MethodRouter<S> + Send>;

/// Handlers are kept unbound; the registrar decides which HTTP method each action answers.
pub struct Controller<S = ()> {
    name: String,
    actions: HashMap<String, ActionRoute<S>>,
}

impl<S> Controller<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    /// Register `handler` under `action`; a later call with the same name replaces it.
    pub fn action<H, T>(mut self, action: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let route: ActionRoute<S> = Box::new(move |filter| on(filter, handler.clone()));
        self.actions.insert(action.into(), route);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub(crate) fn method_router(&self, action: &str, filter: MethodFilter) -> Option<MethodRouter<S>> {
        self.actions.get(action).map(|route| route(filter))
    }
}

impl<S> fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        actions.sort_unstable();
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("actions", &actions)
            .finish()
    }
}
