//! Pack catalog routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use gateway::catalog::{PackAssets, PackDetail, PackSummary};

use crate::services::packs::{self, PackError};
use crate::state::AppState;

/// `GET /api/packs/`
pub async fn list_packs(State(state): State<AppState>) -> Result<Json<Vec<PackSummary>>, StatusCode> {
    let packs = packs::list_packs(&state.assets_dir).await.map_err(pack_error_to_status)?;
    Ok(Json(packs))
}

/// `GET /api/packs/:id/`
pub async fn get_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackDetail>, StatusCode> {
    let pack = packs::load_pack(&state.assets_dir, &id)
        .await
        .map_err(pack_error_to_status)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(pack.detail()))
}

/// `GET /api/packs/:id/assets/`: assets grouped by category. A pack
/// without any assets is reported as missing.
pub async fn get_pack_assets(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackAssets>, StatusCode> {
    let assets = packs::load_pack(&state.assets_dir, &id)
        .await
        .map_err(pack_error_to_status)?
        .map(|pack| pack.assets())
        .filter(|assets| !assets.is_empty())
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(assets))
}

pub(crate) fn pack_error_to_status(err: PackError) -> StatusCode {
    tracing::error!(error = %err, "pack scan failed");
    StatusCode::INTERNAL_SERVER_ERROR
}
