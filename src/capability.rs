//! `EasyCrud`: controller-side shortcuts that pick the rule set from the action.

use crate::error::CrudError;
use crate::extractors::CrudRequest;
use crate::response::CrudOutcome;
use crate::service::{actions, Crud, CrudInvocation, ModelInstance, ModelType, RuleSet, Target};
use async_trait::async_trait;

/// Implement on a controller that owns a [`Crud`] to get `easy_store` / `easy_update` / `easy_delete`.
///
/// ```rust,no_run
/// use easy_crud::{Crud, EasyCrud, RuleSet};
///
/// struct CategoryController {
///     crud: Crud,
/// }
///
/// impl EasyCrud for CategoryController {
///     fn crud(&self) -> &Crud {
///         &self.crud
///     }
///
///     fn rules(&self) -> RuleSet {
///         RuleSet::new().with("name", "required|unique:categories,name")
///     }
/// }
/// ```
#[async_trait]
pub trait EasyCrud: Send + Sync {
    fn crud(&self) -> &Crud;

    /// Rules used for create; update derives its own from these.
    fn rules(&self) -> RuleSet {
        RuleSet::new()
    }

    /// Label passed to the validator and used in logs.
    fn caller(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Update drops uniqueness clauses; destroy (or delete) validates nothing.
    async fn easy_crud(
        &self,
        request: Option<&CrudRequest>,
        target: Target<'_>,
        action: &str,
        redirect_route: &str,
    ) -> Result<CrudOutcome, CrudError> {
        let rules = match action {
            actions::UPDATE => self.rules().without_uniqueness(),
            actions::DESTROY | actions::DELETE => RuleSet::new(),
            _ => self.rules(),
        };
        self.crud()
            .dispatch(CrudInvocation {
                caller: self.caller(),
                request,
                rules,
                target,
                action,
                redirect_route,
            })
            .await
    }

    async fn easy_store(
        &self,
        request: &CrudRequest,
        model: &dyn ModelType,
        redirect_route: &str,
    ) -> Result<CrudOutcome, CrudError> {
        self.easy_crud(Some(request), Target::Static(model), actions::CREATE, redirect_route)
            .await
    }

    async fn easy_update(
        &self,
        request: &CrudRequest,
        record: &dyn ModelInstance,
        redirect_route: &str,
    ) -> Result<CrudOutcome, CrudError> {
        self.easy_crud(Some(request), Target::Instance(record), actions::UPDATE, redirect_route)
            .await
    }

    async fn easy_delete(&self, record: &dyn ModelInstance, redirect_route: &str) -> Result<CrudOutcome, CrudError> {
        self.easy_crud(None, Target::Instance(record), actions::DESTROY, redirect_route)
            .await
    }
}
