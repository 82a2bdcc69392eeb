//! Example consumer: a separate Rust project that mounts easy-crud routes for a categories resource.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`
//!
//! `RESOURCES_PATH` points at a JSON array of resource declarations; without it a single
//! `categories` resource is registered. With `DATABASE_URL` set, `unique` rules are checked
//! against PostgreSQL instead of the in-memory rows.

mod store;

use axum::{
    extract::{FromRef, Path, State},
    response::Html,
    Router,
};
use easy_crud::{
    load_resources, settings_from_env, Controller, Crud, CrudError, CrudOutcome, CrudRequest, EasyCrud, Flash,
    PgPresenceVerifier, ResourceConfig, RouteRegistrar, RuleSet, RuleValidator,
};
use std::sync::Arc;
use store::{CategoryNames, CategoryStore};
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    crud: Crud,
    categories: Arc<CategoryStore>,
}

impl FromRef<AppState> for Crud {
    fn from_ref(state: &AppState) -> Crud {
        state.crud.clone()
    }
}

impl EasyCrud for AppState {
    fn crud(&self) -> &Crud {
        &self.crud
    }

    fn rules(&self) -> RuleSet {
        RuleSet::new()
            .with("name", "required|string|max:60|unique:categories,name")
            .with("description", "nullable|string|max:255")
    }

    fn caller(&self) -> &str {
        "CategoryController"
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn error_list(flash: &Flash) -> String {
    flash
        .errors()
        .clone()
        .into_inner()
        .into_values()
        .flatten()
        .map(|m| format!("<li>{}</li>", escape(&m)))
        .collect()
}

async fn index(State(state): State<AppState>, flash: Flash) -> Result<(Flash, Html<String>), CrudError> {
    let banner = if flash.is_confirmed() { "<p>Saved.</p>" } else { "" };
    let rows: String = state
        .categories
        .all()?
        .iter()
        .map(|c| format!("<li><a href=\"/categories/{}\">{}</a></li>", c.id, escape(&c.name)))
        .collect();
    let page = format!("{}<ul>{}</ul><a href=\"/categories/create\">New</a>", banner, rows);
    Ok((flash, Html(page)))
}

async fn show(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Html<String>, CrudError> {
    let category = state.categories.find(id)?;
    Ok(Html(format!(
        "<h1>{}</h1><p>{}</p>",
        escape(&category.name),
        escape(category.description.as_deref().unwrap_or_default())
    )))
}

async fn create(flash: Flash) -> (Flash, Html<String>) {
    let page = format!(
        "<ul>{}</ul><form method=\"post\" action=\"/categories/create\">\
         <input name=\"name\"><input name=\"description\"><button>Save</button></form>",
        error_list(&flash)
    );
    (flash, Html(page))
}

async fn store(State(state): State<AppState>, request: CrudRequest) -> Result<CrudOutcome, CrudError> {
    state
        .easy_store(&request, state.categories.as_ref(), "categories-index")
        .await
}

async fn edit(State(state): State<AppState>, Path(id): Path<u64>, flash: Flash) -> Result<(Flash, Html<String>), CrudError> {
    let category = state.categories.find(id)?;
    let page = format!(
        "<ul>{}</ul><p>PUT /categories/edit/{} with name={}</p>",
        error_list(&flash),
        category.id,
        escape(&category.name)
    );
    Ok((flash, Html(page)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    request: CrudRequest,
) -> Result<CrudOutcome, CrudError> {
    let record = state.categories.record(id)?;
    state.easy_update(&request, &record, "categories-index").await
}

async fn destroy(State(state): State<AppState>, Path(id): Path<u64>) -> Result<CrudOutcome, CrudError> {
    let record = state.categories.record(id)?;
    state.easy_delete(&record, "categories-index").await
}

fn category_controller() -> Controller<AppState> {
    Controller::new("CategoryController")
        .action("index", index)
        .action("show", show)
        .action("create", create)
        .action("store", store)
        .action("edit", edit)
        .action("update", update)
        .action("destroy", destroy)
}

async fn declared_resources() -> Result<Vec<ResourceConfig>, Box<dyn std::error::Error>> {
    match std::env::var("RESOURCES_PATH") {
        Ok(path) => Ok(load_resources(path).await?),
        Err(_) => Ok(vec![ResourceConfig::new(
            "categories",
            "CategoryController",
            "categories",
            "category",
        )]),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("easy_crud=debug,example_consumer=info")),
        )
        .init();

    let mut registrar = RouteRegistrar::new();
    registrar.controller(category_controller());
    for resource in declared_resources().await? {
        registrar.resource(&resource)?;
    }
    let (routes, table) = registrar.finish();

    let categories = Arc::new(CategoryStore::default());
    let validator = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            RuleValidator::new().with_presence(PgPresenceVerifier::new(pool))
        }
        Err(_) => RuleValidator::new().with_presence(CategoryNames(categories.clone())),
    };
    let state = AppState {
        crud: Crud::new(validator, table).with_settings(settings_from_env()),
        categories,
    };

    let app: Router = routes.with_state(state);
    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
