//! API routes

pub mod agents;
pub mod analytics;
pub mod chat;
pub mod health;
pub mod support;
pub mod tickets;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth::require_auth, config::Config, security::security_headers_middleware, state::AppState,
};

/// CORS for the dashboard origins; `*` opens the API to any site
pub fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public API routes - called by the widget and the ticket dashboard
    let public_api_routes = Router::new()
        .route("/chat", post(chat::chat))
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket).put(tickets::update_ticket),
        )
        .route("/analytics/overview", get(analytics::overview))
        .route("/agents/:id/analytics", get(analytics::agent_analytics))
        .route(
            "/support",
            get(support::list_support_requests).post(support::create_support_request),
        )
        .route("/support/:id", get(support::get_support_request));

    // Protected API routes (Supabase session required)
    let protected_api_routes = Router::new()
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route("/agents/form", post(agents::create_agent_form))
        .route(
            "/agents/:id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/agents/:id/embed", get(agents::embed_code))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_auth,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/api", public_api_routes.merge(protected_api_routes))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
