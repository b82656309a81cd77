mod admin;
pub mod api;
mod middleware;
mod public;

pub use admin::{AdminState, build_admin_router};
pub use api::{ApiState, build_api_router};
pub use public::{HttpState, build_public_app, build_router};

use axum::extract::FromRef;

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub api: ApiState,
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}
