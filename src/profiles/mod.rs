pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgProfileStore, ProfileStore};
pub use repo_types::{Education, Experience, Profile, ProfileFields, ProfileOwner, Social};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::own_profile_routes())
        .merge(handlers::public_routes())
        .merge(handlers::entry_routes())
}
