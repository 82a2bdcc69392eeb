//! In-memory categories: the model side of the example.

use async_trait::async_trait;
use easy_crud::{Fields, ModelError, ModelInstance, ModelType, PresenceVerifier, ValidationError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct CategoryStore {
    rows: RwLock<BTreeMap<u64, Category>>,
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn poisoned<T>(_: T) -> ModelError {
    ModelError::Other("category store lock poisoned".into())
}

impl CategoryStore {
    pub fn all(&self) -> Result<Vec<Category>, ModelError> {
        Ok(self.rows.read().map_err(poisoned)?.values().cloned().collect())
    }

    pub fn find(&self, id: u64) -> Result<Category, ModelError> {
        self.rows
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(format!("category {}", id)))
    }

    /// Handle on one stored row; fails when the row does not exist.
    pub fn record(self: &Arc<Self>, id: u64) -> Result<CategoryRecord, ModelError> {
        self.find(id)?;
        Ok(CategoryRecord {
            id,
            store: self.clone(),
        })
    }
}

#[async_trait]
impl ModelType for CategoryStore {
    fn type_name(&self) -> &str {
        "Category"
    }

    async fn invoke_static(&self, action: &str, fields: Option<Fields>) -> Result<(), ModelError> {
        if action != "create" {
            return Err(ModelError::UnsupportedAction {
                model: self.type_name().to_string(),
                action: action.to_string(),
            });
        }
        let fields = fields.unwrap_or_default();
        let mut rows = self.rows.write().map_err(poisoned)?;
        let id = rows.keys().next_back().map(|id| id + 1).unwrap_or(1);
        rows.insert(
            id,
            Category {
                id,
                name: text(&fields, "name").unwrap_or_default(),
                description: text(&fields, "description"),
            },
        );
        tracing::debug!(id, "category created");
        Ok(())
    }
}

pub struct CategoryRecord {
    id: u64,
    store: Arc<CategoryStore>,
}

#[async_trait]
impl ModelInstance for CategoryRecord {
    async fn invoke(&self, action: &str, fields: Option<Fields>) -> Result<(), ModelError> {
        let mut rows = self.store.rows.write().map_err(poisoned)?;
        match action {
            "update" => {
                let row = rows
                    .get_mut(&self.id)
                    .ok_or_else(|| ModelError::NotFound(format!("category {}", self.id)))?;
                let fields = fields.unwrap_or_default();
                if let Some(name) = text(&fields, "name") {
                    row.name = name;
                }
                if fields.contains_key("description") {
                    row.description = text(&fields, "description");
                }
            }
            "destroy" => {
                rows.remove(&self.id);
            }
            other => {
                return Err(ModelError::UnsupportedAction {
                    model: "Category".into(),
                    action: other.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// `unique:categories,name` against the in-memory rows.
pub struct CategoryNames(pub Arc<CategoryStore>);

#[async_trait]
impl PresenceVerifier for CategoryNames {
    async fn count(&self, table: &str, column: &str, value: &Value) -> Result<u64, ValidationError> {
        if table != "categories" || column != "name" {
            return Err(ValidationError::Presence(format!("unknown column {}.{}", table, column)));
        }
        let rows = self
            .0
            .rows
            .read()
            .map_err(|_| ValidationError::Presence("category store lock poisoned".into()))?;
        Ok(rows.values().filter(|c| Some(c.name.as_str()) == value.as_str()).count() as u64)
    }
}
