use super::handlers::{self, AppState};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the Axum router with all endpoints, cluster routes mounted
/// under `prefix`
pub fn create_router(state: AppState, prefix: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cluster = Router::new()
        .route("/slot/{key}", get(handlers::slot_for_key))
        .route("/hash-tag/analyze", post(handlers::hash_tag_analyze))
        .route("/topology", get(handlers::recommended_topology))
        .route("/topology/{master_count}", get(handlers::topology_for_masters))
        .route("/route/{key}", get(handlers::route_key));

    let prefix = prefix.trim_matches('/');
    let router = Router::new().route("/health", get(handlers::health_check));
    // Nesting at the root is not allowed, merge instead
    let router = if prefix.is_empty() {
        router.merge(cluster)
    } else {
        router.nest(&format!("/{}", prefix), cluster)
    };

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
