use crate::state::AppState;
use axum::Router;

pub mod avatar;
mod claims;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use extractors::{AuthUser, AUTH_HEADER};
pub use jwt::{JwtKeys, TokenError};
pub use repo::{CreateUserError, PgUserStore, UserStore};
pub use repo_types::{NewUser, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::users_routes())
        .merge(handlers::auth_routes())
}
