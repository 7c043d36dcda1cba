//! Map routes, per user and public.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::doc::MapDocument;
use serde::Serialize;

use crate::services::maps::MapError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MapsResponse {
    pub maps: Vec<MapDocument>,
}

/// `GET /api/users/:username/maps/`: the user's maps, newest first.
pub async fn list_maps(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<MapsResponse>, StatusCode> {
    let maps = state.maps.list(&username).await.map_err(map_error_to_status)?;
    Ok(Json(MapsResponse { maps }))
}

/// `POST /api/users/:username/maps/`: store a new map.
pub async fn create_map(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(doc): Json<MapDocument>,
) -> Result<(StatusCode, Json<MapDocument>), StatusCode> {
    let created = state.maps.create(&username, doc).await.map_err(map_error_to_status)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/users/:username/maps/:id/`
pub async fn get_map(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
) -> Result<Json<MapDocument>, StatusCode> {
    let doc = state.maps.get(&username, &id).await.map_err(map_error_to_status)?;
    Ok(Json(doc))
}

/// `PUT /api/users/:username/maps/:id/`: replace an existing map.
pub async fn update_map(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    Json(doc): Json<MapDocument>,
) -> Result<Json<MapDocument>, StatusCode> {
    let updated = state.maps.update(&username, &id, doc).await.map_err(map_error_to_status)?;
    Ok(Json(updated))
}

/// `DELETE /api/users/:username/maps/:id/`
pub async fn delete_map(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    state.maps.delete(&username, &id).await.map_err(map_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/maps/public/`: every user's maps, newest first.
pub async fn public_maps(State(state): State<AppState>) -> Result<Json<MapsResponse>, StatusCode> {
    let maps = state.maps.list_all().await.map_err(map_error_to_status)?;
    Ok(Json(MapsResponse { maps }))
}

pub(crate) fn map_error_to_status(err: MapError) -> StatusCode {
    match err {
        MapError::NotFound(_) => StatusCode::NOT_FOUND,
        MapError::InvalidSegment(_) => StatusCode::BAD_REQUEST,
        MapError::Io(e) => {
            tracing::error!(error = %e, "map storage failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        MapError::Json(e) => {
            tracing::error!(error = %e, "stored map is unreadable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
