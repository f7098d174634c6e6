//! `api` crate — the HTTP surface (spec §6), prefix `/api`.
//!
//! All routes other than `/auth/login` require a bearer token, enforced
//! by [`auth::require_auth`]. Handlers are thin: parse/validate the
//! request, call into `engine`/`db`/`agent`/`catalog`, map the result.

pub mod auth;
pub mod convert;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use db::DbPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{JwtValidator, TokenValidator};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub runtime: Arc<dyn runtime::DurableRuntime>,
    pub invoker: Arc<dyn activity::ActivityInvoker>,
    pub catalog: Arc<catalog::ActionCatalog>,
    pub llm: Arc<dyn agent::LlmClient>,
    pub action_auth: engine::ActionAuth,
    pub token_validator: Arc<dyn TokenValidator>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let protected = Router::new()
        .route("/actions", get(handlers::actions::list))
        .route("/actions/:id", get(handlers::actions::get))
        .route("/workflows", get(handlers::workflows::list).post(handlers::workflows::create))
        .route(
            "/workflows/:id",
            get(handlers::workflows::get)
                .put(handlers::workflows::update)
                .delete(handlers::workflows::delete),
        )
        .route("/workflows/:id/execute", post(handlers::workflows::execute))
        .route("/workflows/suggest-metadata", post(handlers::workflows::suggest_metadata))
        .route("/executions", get(handlers::executions::list))
        .route("/executions/:id", get(handlers::executions::get))
        .route("/executions/:id/cancel", post(handlers::executions::cancel))
        .route("/executions/:id/sync", post(handlers::executions::sync))
        .route("/chat", post(handlers::chat::turn))
        .route("/chat/sessions", get(handlers::chat::list_sessions))
        .route(
            "/chat/sessions/:id",
            get(handlers::chat::get_session).delete(handlers::chat::delete_session),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let public = Router::new().route("/auth/login", post(handlers::auth::login));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> Result<(), std::io::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}

/// Build the default token validator from `SECRET_KEY`/`ACCESS_TOKEN_EXPIRE_HOURS`.
pub fn default_token_validator(secret: impl Into<String>, expire_hours: i64) -> Arc<dyn TokenValidator> {
    Arc::new(JwtValidator::new(secret, expire_hours))
}
