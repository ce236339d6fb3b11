use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::warn;

use crate::auth::jwt::{JwtKeys, VerifyError};
use crate::error::ApiError;
use crate::model::{Role, User};
use crate::state::AppState;

/// The authenticated caller, freshly loaded from the store.
///
/// Status is re-read on every request rather than trusted from the
/// token, so deactivating an account locks it out immediately even
/// though its tokens remain cryptographically valid.
#[derive(Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::NoToken)?;

        let token = auth.strip_prefix("Bearer ").ok_or(ApiError::NoToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| match e {
            VerifyError::Expired => ApiError::TokenExpired,
            VerifyError::Malformed | VerifyError::InvalidSignature => ApiError::InvalidToken,
        })?;

        let user = state
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(ApiError::UnknownSubject)?;

        if !user.status.is_active() {
            warn!(user_id = %user.id, "inactive account presented a valid token");
            return Err(ApiError::AccountDeactivated);
        }

        Ok(CurrentUser(user))
    }
}

/// Pure role-membership check; no side effects beyond the log line.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        warn!(user_id = %user.id, have = %user.role, allowed = ?allowed, "role check failed");
        Err(ApiError::RoleNotPermitted)
    }
}

/// [`CurrentUser`] plus an admin role check. Authentication failures win
/// over authorization ones because the gate runs first.
#[derive(Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_role(&user, &[Role::Admin])?;
        Ok(AdminUser(user))
    }
}
