mod app;
mod auth;
mod cache;
mod config;
mod error;
mod model;
mod state;
mod store;
mod users;
mod validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    if let Some(seed) = state.config.admin_seed.as_ref() {
        if let Err(e) = users::provision_admin(state.store.as_ref(), seed).await {
            tracing::warn!(error = %e, "admin provisioning failed; continuing");
        }
    }

    let host = state.config.host.clone();
    let port = state.config.port;
    let cache = state.cache.clone();

    let app = app::build_app(state);
    let served = app::serve(app, &host, port).await;

    cache.close().await;
    served
}
