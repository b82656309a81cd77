pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infra::http::RouterState;

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/api/subscribe", post(handlers::subscribe))
        .route("/api/unsubscribe", post(handlers::unsubscribe))
        .route("/api/push/public-key", get(handlers::public_key))
        .with_state(state)
}
