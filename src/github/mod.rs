pub mod client;
pub mod handlers;

pub use client::{GithubClient, RepoLookup};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::github_routes()
}
