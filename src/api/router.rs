use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no authentication required
    let public = Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/metrics", get(handlers::system::render_metrics));

    // Protected API routes: require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Campaigns
        .route("/api/campaigns", get(handlers::campaigns::list).post(handlers::campaigns::create))
        .route(
            "/api/campaigns/:id",
            get(handlers::campaigns::detail).delete(handlers::campaigns::delete),
        )
        // Growth metrics
        .route("/api/growth/compute", post(handlers::growth::compute))
        .route("/api/growth/report", get(handlers::growth::report))
        .route(
            "/api/growth/snapshots",
            get(handlers::growth::snapshots).post(handlers::growth::take_snapshot),
        )
        .route("/api/growth/snapshots/latest", get(handlers::growth::latest_snapshot))
        // Config
        .route("/api/config/attribution", get(handlers::system::attribution_config))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Dashboards are served from another origin; the token guards access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
