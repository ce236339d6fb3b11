use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api",
              Router::new()
                  .merge(auth::router())
                  .merge(users::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::extract::{FromRequestParts, Path, State};
    use axum::http::{header, Request};
    use axum::Json;

    use super::*;
    use crate::auth::dto::{LoginRequest, SignupRequest};
    use crate::auth::extractors::{AdminUser, CurrentUser};
    use crate::auth::handlers::{login, me, signup};
    use crate::config::AdminSeed;
    use crate::error::ApiError;
    use crate::model::Role;
    use crate::users::handlers::{activate_user, deactivate_user};
    use crate::users::provision_admin;

    // axum panics at build time on conflicting routes, so merging the
    // routers is itself worth a test.
    #[tokio::test]
    async fn router_builds_without_route_conflicts() {
        let _app = build_app(AppState::fake());
    }

    async fn gate(state: &AppState, token: &str) -> Result<CurrentUser, ApiError> {
        let (mut parts, _) = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .expect("request")
            .into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn account_lifecycle_across_modules() {
        let state = AppState::fake();
        provision_admin(
            state.store.as_ref(),
            &AdminSeed {
                email: "admin@example.com".to_string(),
                password: "Adm1n!secret".to_string(),
                full_name: "System Administrator".to_string(),
            },
        )
        .await
        .expect("provision admin");
        let admin = state
            .store
            .find_by_email("admin@example.com")
            .await
            .expect("lookup")
            .expect("admin present");

        signup(
            State(state.clone()),
            Json(SignupRequest {
                email: "member@example.com".to_string(),
                password: "Memb3r!pass".to_string(),
                full_name: "Member".to_string(),
            }),
        )
        .await
        .expect("signup");

        let login_req = || {
            Json(LoginRequest {
                email: "member@example.com".to_string(),
                password: "Memb3r!pass".to_string(),
            })
        };
        let Json(body) = login(State(state.clone()), login_req())
            .await
            .expect("first login");
        let auth = body.data.expect("data");
        assert_eq!(auth.user.role, Role::User);
        let member_id = auth.user.id;

        // The issued token resolves back to the same account.
        let current = gate(&state, &auth.token).await.expect("gate passes");
        let Json(me_body) = me(current).await;
        assert_eq!(me_body.data.expect("data").user.id, member_id);

        deactivate_user(
            State(state.clone()),
            AdminUser(admin.clone()),
            Path(member_id.to_string()),
        )
        .await
        .expect("deactivate");

        // The still-valid token is now refused, and so is a fresh login.
        let err = gate(&state, &auth.token).await.unwrap_err();
        assert!(matches!(err, ApiError::AccountDeactivated));
        let err = login(State(state.clone()), login_req()).await.unwrap_err();
        assert!(matches!(err, ApiError::AccountDeactivated));

        activate_user(
            State(state.clone()),
            AdminUser(admin),
            Path(member_id.to_string()),
        )
        .await
        .expect("activate");
        gate(&state, &auth.token).await.expect("token works again");
        login(State(state.clone()), login_req())
            .await
            .expect("login after reactivation");
    }
}
