//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the Live-mode REST API under `/api` plus a health probe. Every API
//! path ends with a slash; the gateway's Live client builds URLs the same
//! way. Pack images are served straight from the assets directory.

pub mod maps;
pub mod packs;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let assets = ServeDir::new(state.assets_dir.as_path());

    Router::new()
        .route("/api/packs/", get(packs::list_packs))
        .route("/api/packs/{id}/", get(packs::get_pack))
        .route("/api/packs/{id}/assets/", get(packs::get_pack_assets))
        .route("/api/users/", get(users::list_users).post(users::create_user))
        .route("/api/users/{username}/maps/", get(maps::list_maps).post(maps::create_map))
        .route(
            "/api/users/{username}/maps/{id}/",
            get(maps::get_map).put(maps::update_map).delete(maps::delete_map),
        )
        .route("/api/maps/public/", get(maps::public_maps))
        .route("/healthz", get(healthz))
        .nest_service("/api/assets", assets)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
