use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthPayload, LoginRequest, SignupRequest, UserPayload};
use crate::auth::extractors::CurrentUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::cache;
use crate::error::{ApiError, ApiSuccess};
use crate::model::{PublicUser, Role, Status};
use crate::state::AppState;
use crate::store::NewUser;
use crate::validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Creates an account. Does not log the caller in; the client is
/// expected to follow up with a login request.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiSuccess<UserPayload>>), ApiError> {
    payload.check()?;
    let email = validate::normalize_email(&payload.email);
    let full_name = payload.full_name.trim().to_string();

    if state.store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "signup with taken email");
        return Err(ApiError::EmailInUse);
    }

    let password_hash = hash_password(&payload.password)?;
    // A concurrent signup can still slip past the lookup; the store's
    // unique index turns that into DuplicateEmail.
    let user = state
        .store
        .create(NewUser {
            email,
            password_hash,
            full_name,
            role: Role::User,
            status: Status::Active,
        })
        .await?;
    state.cache.invalidate(cache::USERS_PATTERN).await;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(ApiSuccess::with_message(
            "User registered successfully",
            UserPayload {
                user: PublicUser::from(&user),
            },
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiSuccess<AuthPayload>>, ApiError> {
    payload.check()?;
    let email = validate::normalize_email(&payload.email);

    // Unknown email and wrong password take the same exit so the
    // response does not reveal which one it was.
    let user = match state.store.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.status.is_active() {
        warn!(user_id = %user.id, "login to deactivated account");
        return Err(ApiError::AccountDeactivated);
    }

    let mut stamped = user;
    stamped.last_login = Some(OffsetDateTime::now_utc());
    let user = state.store.save(&stamped).await?;
    // last_login shows up in the admin listing, so it stales the cache
    // like any other write.
    state.cache.invalidate(cache::USERS_PATTERN).await;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(ApiSuccess::with_message(
        "Login successful",
        AuthPayload {
            token,
            user: PublicUser::from(&user),
        },
    )))
}

/// Stateless acknowledgement; the token stays valid until it expires
/// and the client simply discards it.
#[instrument(skip_all)]
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<ApiSuccess<()>> {
    info!(user_id = %user.id, "user logged out");
    Json(ApiSuccess::message_only("Logged out successfully"))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiSuccess<UserPayload>> {
    Json(ApiSuccess::new(UserPayload {
        user: PublicUser::from(&user),
    }))
}
