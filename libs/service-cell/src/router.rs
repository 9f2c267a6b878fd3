use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;

pub fn service_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/", get(handlers::list_services));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_service))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
