use axum::Router;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::AdminSeed;
use crate::model::{Role, Status};
use crate::state::AppState;
use crate::store::{NewUser, StoreError, UserStore};
use crate::validate;

pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::routes()
}

/// Ensures the configured administrator account exists. An account
/// already registered under the seed email is left untouched.
pub async fn provision_admin(store: &dyn UserStore, seed: &AdminSeed) -> anyhow::Result<()> {
    let email = validate::normalize_email(&seed.email);
    if store.find_by_email(&email).await?.is_some() {
        info!(%email, "admin account already present");
        return Ok(());
    }

    let password_hash = hash_password(&seed.password)?;
    match store
        .create(NewUser {
            email: email.clone(),
            password_hash,
            full_name: seed.full_name.clone(),
            role: Role::Admin,
            status: Status::Active,
        })
        .await
    {
        Ok(admin) => info!(user_id = %admin.id, %email, "admin account provisioned"),
        // Lost a race against a concurrent signup; someone owns the
        // email now and that is good enough.
        Err(StoreError::DuplicateEmail) => info!(%email, "admin account already present"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
