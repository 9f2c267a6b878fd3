use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;

pub fn blocked_day_routes(state: Arc<AppConfig>) -> Router {
    // The listing is public: the booking form needs it to disable dates.
    let public_routes = Router::new().route("/", get(handlers::list_blocked_days));

    let protected_routes = Router::new()
        .route("/", post(handlers::block_day))
        .route("/{id}", delete(handlers::unblock_day))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
