use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", get(handlers::get_session))
        .route("/sessions/:id", delete(handlers::delete_session))
        // Wizard steps
        .route("/sessions/:id/start", post(handlers::start))
        .route("/sessions/:id/back", post(handlers::back))
        .route("/sessions/:id/query", put(handlers::set_query))
        .route("/sessions/:id/submit", post(handlers::submit))
        .route("/sessions/:id/new-search", post(handlers::new_search))
        // Filters
        .route("/sessions/:id/filters", put(handlers::update_filters))
        .route("/sessions/:id/filters/clear", post(handlers::clear_filters))
        // Per-item flags
        .route(
            "/sessions/:id/items/:item/expand",
            post(handlers::toggle_expanded),
        )
        .route(
            "/sessions/:id/items/:item/compare",
            post(handlers::toggle_comparison),
        )
        .route(
            "/sessions/:id/items/:item/favorite",
            post(handlers::toggle_favorite),
        )
        // Comparison
        .route(
            "/sessions/:id/comparison/toggle",
            post(handlers::toggle_comparison_panel),
        )
        .route("/sessions/:id/comparison", get(handlers::get_comparison))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
