//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::state::AppState;

/// Build the API router, with the web shell as fallback when configured
pub fn router(state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/api/device", get(api::get_device))
        .route("/api/device/connect", post(api::connect_device))
        .route("/api/photos", get(api::list_photos))
        .route("/api/schema", get(api::get_schema))
        .route(
            "/api/recipes",
            get(api::list_recipes).post(api::create_recipe),
        )
        .route(
            "/api/recipes/{id}",
            get(api::get_recipe)
                .patch(api::update_recipe)
                .delete(api::delete_recipe),
        );

    let app = match &state.config.server.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .with_state(state)
}

/// Run the web server
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state.clone());

    // Initial connection attempt in the background, as the UI does on load
    tokio::spawn(async move {
        let outcome = state.device.connect().await;
        info!(state = ?outcome.state, "Initial camera connection settled");
    });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}
