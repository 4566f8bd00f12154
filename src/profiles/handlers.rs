use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::ApiJson,
    profiles::{
        dto::{EducationRequest, ExperienceRequest, MessageResponse, ProfileRequest},
        repo_types::Profile,
        services::{build_education, build_experience, build_profile_fields},
    },
    state::AppState,
};

const NO_PROFILE: &str = "There is no profile for this user";

pub fn own_profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(list_profiles).post(upsert_profile).delete(delete_profile),
        )
        .route("/profile/me", get(get_own_profile))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/profile/user/:user_id", get(get_profile_by_user))
}

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
}

async fn load_own(state: &AppState, user_id: Uuid) -> Result<Profile, ApiError> {
    state.profiles.find_by_user(user_id).await?.ok_or_else(no_profile)
}

fn no_profile() -> ApiError {
    ApiError::NotFound(NO_PROFILE.into())
}

#[instrument(skip(state))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(load_own(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let fields = build_profile_fields(payload)?;

    if let Some(profile) = state.profiles.update(user_id, &fields).await? {
        info!(user_id = %user_id, profile_id = %profile.id, "profile updated");
        return Ok(Json(profile));
    }

    if let Some(profile) = state.profiles.create(user_id, &fields).await? {
        info!(user_id = %user_id, profile_id = %profile.id, "profile created");
        return Ok(Json(profile));
    }

    // A concurrent submission created it first; merge over theirs.
    let profile = state
        .profiles
        .update(user_id, &fields)
        .await?
        .ok_or_else(|| anyhow::anyhow!("profile for {user_id} vanished during upsert"))?;
    info!(
        user_id = %user_id,
        profile_id = %profile.id,
        "profile updated after concurrent create"
    );
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.profiles.list().await?))
}

#[instrument(skip(state))]
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let not_found = || ApiError::NotFound("Profile not found".into());
    let Ok(user_id) = user_id.parse::<Uuid>() else {
        warn!(user_id = %user_id, "malformed user id");
        return Err(not_found());
    };
    let profile = state.profiles.find_by_user(user_id).await?.ok_or_else(not_found)?;
    Ok(Json(profile))
}

/// Removes the profile, then the user. The two deletes are independent: a
/// failure in the second leaves the user without a profile.
#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let had_profile = state.profiles.delete_by_user(user_id).await?;
    let had_user = state.users.delete(user_id).await?;
    info!(user_id = %user_id, had_profile, had_user, "user deleted");
    Ok(Json(MessageResponse {
        msg: "User deleted".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    let entry = build_experience(payload)?;
    let profile = state
        .profiles
        .add_experience(user_id, &entry)
        .await?
        .ok_or_else(no_profile)?;
    info!(user_id = %user_id, entry_id = %entry.id, "experience added");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let Ok(entry_id) = exp_id.parse::<Uuid>() else {
        warn!(user_id = %user_id, entry_id = %exp_id, "malformed experience id");
        return Ok(Json(load_own(&state, user_id).await?));
    };
    let profile = state
        .profiles
        .remove_experience(user_id, entry_id)
        .await?
        .ok_or_else(no_profile)?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    let entry = build_education(payload)?;
    let profile = state
        .profiles
        .add_education(user_id, &entry)
        .await?
        .ok_or_else(no_profile)?;
    info!(user_id = %user_id, entry_id = %entry.id, "education added");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let Ok(entry_id) = edu_id.parse::<Uuid>() else {
        warn!(user_id = %user_id, entry_id = %edu_id, "malformed education id");
        return Ok(Json(load_own(&state, user_id).await?));
    };
    let profile = state
        .profiles
        .remove_education(user_id, entry_id)
        .await?
        .ok_or_else(no_profile)?;
    Ok(Json(profile))
}
