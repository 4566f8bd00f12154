use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        avatar::gravatar_url,
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        password::{hash_password_blocking, verify_password_blocking},
        repo::CreateUserError,
        repo_types::{NewUser, User},
    },
    error::ApiError,
    extract::ApiJson,
    state::AppState,
    validation::Validator,
};

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", get(get_me).post(login))
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email.map(|e| e.trim().to_lowercase())
}

fn issue_token(state: &AppState, user: &User) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .jwt
        .issue(user.id)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("sign token")))?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(payload.email);

    let mut v = Validator::new();
    v.required("name", payload.name.as_deref(), "Name is required");
    v.email("email", email.as_deref(), "Please include a valid email");
    v.min_len(
        "password",
        payload.password.as_deref(),
        6,
        "Please enter a password with 6 or more characters",
    );
    if let Err(e) = v.finish() {
        warn!("register rejected by validation");
        return Err(e);
    }

    // Validation guarantees all three are present.
    let (Some(name), Some(email), Some(password)) = (payload.name, email, payload.password) else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated fields missing")));
    };

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password_blocking(password).await?;
    let new_user = NewUser {
        name: name.trim().to_string(),
        avatar: gravatar_url(&email),
        email,
        password_hash,
    };

    let user = match state.users.create(new_user).await {
        Ok(u) => u,
        Err(CreateUserError::DuplicateEmail) => {
            warn!("email registered concurrently");
            return Err(ApiError::Conflict("User already exists".into()));
        }
        Err(CreateUserError::Other(e)) => return Err(ApiError::Internal(e)),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_token(&state, &user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(payload.email);

    let mut v = Validator::new();
    v.email("email", email.as_deref(), "Please include a valid email");
    if payload.password.is_none() {
        v.push("password", "Password is required");
    }
    v.finish()?;

    let (Some(email), Some(password)) = (email, payload.password) else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated fields missing")));
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    issue_token(&state, &user)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    match state.users.find_by_id(user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            warn!(user_id = %user_id, "token user no longer exists");
            Err(ApiError::Unauthorized("User not found".into()))
        }
    }
}
