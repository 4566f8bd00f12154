use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::ApiError,
    github::client::RepoLookup,
    state::AppState,
};

pub fn github_routes() -> Router<AppState> {
    Router::new().route("/profile/github/:username", get(user_repos))
}

#[instrument(skip(state))]
pub async fn user_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.github.user_repos(&username).await? {
        RepoLookup::Found(repos) => Ok(Json(repos)),
        RepoLookup::Missing(status) => {
            warn!(%status, username = %username, "github lookup failed");
            Err(ApiError::Upstream("No github profile found".into()))
        }
    }
}
