pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::call_relay;
use crate::session::SESSION_COOKIE_NAME;
use crate::user_auth;
use crate::websocket::ws_handler;
use state::AppState;

/// CORS for a single browser origin with credentials (the session cookie)
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(origin) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(origin, "Ignoring invalid CORS origin: {}", e);
            return None;
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

/// Assemble the HTTP surface over `state`
pub fn build_router(state: Arc<AppState>, cors_origin: Option<&str>) -> Router {
    // ==========================================================================
    // Session-protected Routes
    // ==========================================================================
    let protected_routes = Router::new()
        .route("/create-call", post(call_relay::handlers::create_call))
        .layer(from_fn(user_auth::middleware::require_session));

    // ==========================================================================
    // Public Routes
    // ==========================================================================
    let api_routes = Router::new()
        .route("/signup", post(user_auth::handlers::signup))
        .route("/login", post(user_auth::handlers::login))
        .route("/check-auth", get(user_auth::handlers::check_auth))
        .route("/logout", get(user_auth::handlers::logout))
        .route("/health", get(handlers::health_check))
        .merge(protected_routes);

    // ==========================================================================
    // Session cookie (wraps the gate above)
    // ==========================================================================
    let cookie = &state.session_cookie;
    let session_layer = SessionManagerLayer::new(state.sessions.clone())
        .with_name(SESSION_COOKIE_NAME)
        .with_path(cookie.path.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(cookie.secure)
        .with_expiry(Expiry::OnInactivity(cookie.ttl()))
        .with_signed(cookie.key().clone());
    let api_routes = api_routes.layer(session_layer);

    let app = Router::new()
        // WebSocket relay
        .route("/ws", get(ws_handler))
        .nest("/api", api_routes)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    match cors_origin.and_then(cors_layer) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Bind `host:port` and serve `app` until the process exits
pub async fn run_server(host: &str, port: u16, app: Router) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        );
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("WebSocket relay: ws://{}/ws", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}
