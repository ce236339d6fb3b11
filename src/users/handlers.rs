use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, put},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::UserPayload;
use crate::auth::extractors::{AdminUser, CurrentUser};
use crate::auth::password::{hash_password, verify_password};
use crate::cache;
use crate::error::{ApiError, ApiSuccess};
use crate::model::{PublicUser, Status, User};
use crate::state::AppState;
use crate::users::dto::{
    ChangePasswordRequest, ListUsersQuery, PaginationMeta, UpdateProfileRequest, UserListPayload,
};
use crate::validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users/password", put(change_password))
        .route("/users/:id", get(get_user))
        .route("/users/:id/activate", patch(activate_user))
        .route("/users/:id/deactivate", patch(deactivate_user))
}

/// A path segment that is not a UUID cannot name any user.
fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiSuccess<UserListPayload>>, ApiError> {
    let (page, limit) = query.sanitized();
    let key = cache::list_key(page, limit);

    if let Some(hit) = state.cache.get(&key).await {
        if let Ok(payload) = serde_json::from_str::<UserListPayload>(&hit) {
            debug!(%key, "user list served from cache");
            return Ok(Json(ApiSuccess::new(payload)));
        }
        // Corrupt entry; fall through to the store.
    }

    let total = state.store.count().await?;
    // Saturating keeps an absurd page number a valid (empty) page
    // instead of a negative offset.
    let skip = (page - 1).saturating_mul(limit);
    let users = state.store.list_page(skip, limit).await?;
    let payload = UserListPayload {
        users: users.iter().map(PublicUser::from).collect(),
        pagination: PaginationMeta::new(total, page, limit),
    };

    if let Ok(serialized) = serde_json::to_string(&payload) {
        state
            .cache
            .set(&key, &serialized, cache::DEFAULT_TTL_SECS)
            .await;
    }

    Ok(Json(ApiSuccess::new(payload)))
}

#[instrument(skip_all, fields(id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<UserPayload>>, ApiError> {
    let id = parse_user_id(&id)?;
    let key = cache::user_key(id);

    if let Some(hit) = state.cache.get(&key).await {
        if let Ok(user) = serde_json::from_str::<PublicUser>(&hit) {
            debug!(%key, "user served from cache");
            return Ok(Json(ApiSuccess::new(UserPayload { user })));
        }
    }

    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let user = PublicUser::from(&user);

    if let Ok(serialized) = serde_json::to_string(&user) {
        state
            .cache
            .set(&key, &serialized, cache::DEFAULT_TTL_SECS)
            .await;
    }

    Ok(Json(ApiSuccess::new(UserPayload { user })))
}

#[instrument(skip_all, fields(id = %id))]
pub async fn activate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<UserPayload>>, ApiError> {
    set_status(&state, &admin, &id, Status::Active, "User activated successfully").await
}

#[instrument(skip_all, fields(id = %id))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<UserPayload>>, ApiError> {
    set_status(
        &state,
        &admin,
        &id,
        Status::Inactive,
        "User deactivated successfully",
    )
    .await
}

async fn set_status(
    state: &AppState,
    admin: &User,
    raw_id: &str,
    status: Status,
    message: &'static str,
) -> Result<Json<ApiSuccess<UserPayload>>, ApiError> {
    let id = parse_user_id(raw_id)?;
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Admins cannot toggle themselves; the last admin would otherwise
    // be able to lock everyone out, including itself.
    if user.id == admin.id {
        warn!(admin_id = %admin.id, "admin attempted to change own status");
        return Err(ApiError::SelfModification);
    }

    let mut edited = user;
    edited.status = status;
    let user = state.store.save(&edited).await?;
    state.cache.invalidate(cache::USERS_PATTERN).await;

    info!(user_id = %user.id, status = %user.status, admin_id = %admin.id, "user status changed");
    Ok(Json(ApiSuccess::with_message(
        message,
        UserPayload {
            user: PublicUser::from(&user),
        },
    )))
}

#[instrument(skip_all)]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ApiSuccess<UserPayload>> {
    Json(ApiSuccess::new(UserPayload {
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiSuccess<UserPayload>>, ApiError> {
    payload.check()?;

    let mut edited = user;
    if let Some(email) = payload.email {
        let email = validate::normalize_email(&email);
        if email != edited.email {
            if state.store.find_by_email(&email).await?.is_some() {
                warn!(user_id = %edited.id, "profile update to taken email");
                return Err(ApiError::EmailInUse);
            }
            edited.email = email;
        }
    }
    if let Some(full_name) = payload.full_name {
        edited.full_name = full_name.trim().to_string();
    }

    let user = state.store.save(&edited).await?;
    state.cache.invalidate(cache::USERS_PATTERN).await;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(ApiSuccess::with_message(
        "Profile updated successfully",
        UserPayload {
            user: PublicUser::from(&user),
        },
    )))
}

#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    payload.check()?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Err(ApiError::CurrentPasswordIncorrect);
    }

    let mut edited = user;
    edited.password_hash = hash_password(&payload.new_password)?;
    let user = state.store.save(&edited).await?;
    state.cache.invalidate(cache::USERS_PATTERN).await;

    info!(user_id = %user.id, "password changed");
    Ok(Json(ApiSuccess::message_only("Password changed successfully")))
}
