//! User routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::users::{self, UserError};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateUserBody {
    #[serde(default)]
    pub username: Option<String>,
}

/// `GET /api/users/`: every user, always including `temp`.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, StatusCode> {
    let users = users::list_users(state.users_dir()).await.map_err(user_error_to_status)?;
    Ok(Json(UsersResponse { users }))
}

/// `POST /api/users/`: create a user directory.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let requested = body.username.unwrap_or_default();
    let name = users::create_user(state.users_dir(), &requested).await.map_err(user_error_to_status)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "message": format!("User {name} created") }))))
}

pub(crate) fn user_error_to_status(err: UserError) -> StatusCode {
    match err {
        UserError::Empty | UserError::InvalidName(_) => StatusCode::BAD_REQUEST,
        UserError::Io(e) => {
            tracing::error!(error = %e, "user storage failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
