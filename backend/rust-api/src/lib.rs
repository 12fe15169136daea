use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod engine;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest("/api/v1", api_routes())
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/skills", get(handlers::assessments::list_skills))
        .nest("/assessments", assessment_routes())
        .layer(CorsLayer::permissive())
}

fn assessment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::assessments::create_assessment))
        .route("/{id}", get(handlers::assessments::get_assessment))
        .route(
            "/{id}/responses",
            post(handlers::assessments::submit_response),
        )
        .route(
            "/{id}/complete",
            post(handlers::assessments::complete_assessment),
        )
        .route("/{id}/result", get(handlers::assessments::get_result))
}
