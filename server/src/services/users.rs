//! User directories.
//!
//! A user exists when `{users_dir}/{name}/` exists. The shared `temp` user
//! is always listed, whether or not anything has been saved under it.

use std::collections::BTreeSet;
use std::path::Path;

use gateway::catalog::is_plain_segment;
use gateway::offline::DEFAULT_USER;
use tracing::info;

use crate::services::maps::list_dirs;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("username is required")]
    Empty,
    #[error("invalid username: {0:?}")]
    InvalidName(String),
    #[error("user storage io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Every user directory name plus `temp`, sorted.
///
/// # Errors
///
/// The users directory exists but cannot be listed.
pub async fn list_users(users_dir: &Path) -> Result<Vec<String>, UserError> {
    let mut names: BTreeSet<String> = list_dirs(users_dir)
        .await?
        .iter()
        .filter_map(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    names.insert(DEFAULT_USER.to_owned());
    Ok(names.into_iter().collect())
}

/// Create `{users_dir}/{name}/maps/`. Creating an existing user succeeds.
/// Returns the trimmed name.
///
/// # Errors
///
/// [`UserError::Empty`] for a blank name, [`UserError::InvalidName`] for a
/// name that cannot be a directory name, or an io failure.
pub async fn create_user(users_dir: &Path, username: &str) -> Result<String, UserError> {
    let name = username.trim();
    if name.is_empty() {
        return Err(UserError::Empty);
    }
    if !is_plain_segment(name) {
        return Err(UserError::InvalidName(name.to_owned()));
    }
    tokio::fs::create_dir_all(users_dir.join(name).join("maps")).await?;
    info!(user = %name, "user created");
    Ok(name.to_owned())
}
