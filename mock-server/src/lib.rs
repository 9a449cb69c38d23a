//! In-memory reference backend for the recipe API.
//!
//! Serves the `/recipes` surface the client core consumes: integer ids
//! assigned from 1, server-side timestamps, and the message-style write
//! acknowledgements (`{message, recipe_id}`) that the client has to
//! reconcile against.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write payload. Unknown fields (a client echoing `recipe_id`, timestamps)
/// are ignored.
#[derive(Deserialize)]
pub struct RecipeInput {
    pub title: String,
    pub ingredients: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeList {
    pub recipes: Vec<Recipe>,
}

/// Acknowledgement returned by create and update instead of the record.
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteAck {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    recipes: BTreeMap<u64, Recipe>,
}

impl Store {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn require_title(input: &RecipeInput) -> Result<(), StatusCode> {
    if input.title.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn list_recipes(State(db): State<Db>) -> Json<RecipeList> {
    let store = db.read().await;
    Json(RecipeList {
        recipes: store.recipes.values().cloned().collect(),
    })
}

async fn create_recipe(
    State(db): State<Db>,
    Json(input): Json<RecipeInput>,
) -> Result<(StatusCode, Json<WriteAck>), StatusCode> {
    require_title(&input)?;
    let mut store = db.write().await;
    let now = Utc::now();
    let recipe = Recipe {
        recipe_id: store.allocate_id(),
        title: input.title,
        ingredients: input.ingredients,
        description: input.description,
        created_at: now,
        updated_at: now,
    };
    let recipe_id = recipe.recipe_id;
    store.recipes.insert(recipe_id, recipe);
    tracing::info!(recipe_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(WriteAck {
            message: "Recipe created".to_string(),
            recipe_id: Some(recipe_id),
        }),
    ))
}

async fn get_recipe(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Recipe>, StatusCode> {
    let store = db.read().await;
    store.recipes.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_recipe(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<WriteAck>, StatusCode> {
    require_title(&input)?;
    let mut store = db.write().await;
    let recipe = store.recipes.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    recipe.title = input.title;
    recipe.ingredients = input.ingredients;
    recipe.description = input.description;
    recipe.updated_at = Utc::now();
    tracing::info!(recipe_id = id, "recipe updated");
    Ok(Json(WriteAck {
        message: "Recipe updated".to_string(),
        recipe_id: None,
    }))
}

async fn delete_recipe(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .recipes
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}
