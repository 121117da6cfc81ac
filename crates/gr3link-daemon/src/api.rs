//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gr3link_core::{
    FilmSimulation, ParamSpec, RecipeDraft, RecipeId, RecipePatch, StoreError, SCHEMA,
};
use gr3link_device::{ConnectFailure, ConnectionState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Map a store error to its HTTP status
fn store_error(e: StoreError) -> Response {
    let status = match &e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => {
            error!(error = %e, "Recipe store operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiError::new(e.to_string()))).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceStatus {
    state: ConnectionState,
    last_failure: Option<ConnectFailure>,
}

/// Current connection state and the last fallback reason
pub async fn get_device(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(DeviceStatus {
        state: state.device.state().await,
        last_failure: state.device.last_failure().await,
    })
}

/// Probe the camera, falling back to demo mode
pub async fn connect_device(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Connect requested");
    Json(state.device.connect().await)
}

pub async fn list_photos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.device.get_photos().await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaResponse {
    params: &'static [ParamSpec],
    film_simulations: &'static [FilmSimulation],
}

/// Parameter schema and the film simulation modes, for building edit forms
pub async fn get_schema() -> impl IntoResponse {
    Json(SchemaResponse {
        params: SCHEMA,
        film_simulations: &FilmSimulation::ALL,
    })
}

pub async fn list_recipes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let recipes = state.recipes.read().await;
    Json(recipes.get_all().to_vec())
}

pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let recipes = state.recipes.read().await;
    match recipes.get(&RecipeId::new(id)) {
        Some(recipe) => Json(recipe.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new("Recipe not found")),
        )
            .into_response(),
    }
}

pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<RecipeDraft>,
) -> impl IntoResponse {
    let mut recipes = state.recipes.write().await;
    match recipes.add(draft) {
        Ok(recipe) => {
            info!(id = %recipe.id, name = %recipe.name, "Recipe created");
            (StatusCode::CREATED, Json(recipe)).into_response()
        }
        Err(e) => store_error(e),
    }
}

pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<RecipePatch>,
) -> impl IntoResponse {
    let mut recipes = state.recipes.write().await;
    match recipes.update(&RecipeId::new(id), &patch) {
        Ok(recipe) => {
            info!(id = %recipe.id, "Recipe updated");
            Json(recipe).into_response()
        }
        Err(e) => store_error(e),
    }
}

#[derive(Serialize)]
struct DeleteResponse {
    status: &'static str,
}

/// Delete a recipe; deleting an absent id is not an error
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut recipes = state.recipes.write().await;
    match recipes.delete(&RecipeId::new(id.clone())) {
        Ok(removed) => {
            info!(id = %id, removed, "Recipe delete requested");
            let status = if removed { "deleted" } else { "absent" };
            Json(DeleteResponse { status }).into_response()
        }
        Err(e) => store_error(e),
    }
}
