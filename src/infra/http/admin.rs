//! Loopback-only operator surface.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::notify::{Announcement, DispatchError, NotifyService};

use super::api::{
    error::{ApiError, codes},
    handlers::json_rejection,
    models::{NotifyRequest, NotifyResponse},
};
use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct AdminState {
    pub notify: Arc<NotifyService>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/api/notify", post(notify))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn notify(
    State(state): State<AdminState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let announcement = Announcement::from(request);

    let outcome = state
        .notify
        .announce(&announcement)
        .await
        .map_err(dispatch_error)?;

    Ok(Json(NotifyResponse::from(outcome)))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn dispatch_error(err: DispatchError) -> ApiError {
    match err {
        DispatchError::NotConfigured => {
            ApiError::not_configured("Push notifications not configured")
        }
        DispatchError::Invalid(err) => {
            ApiError::bad_request("Title and body are required", Some(err.to_string()))
        }
        DispatchError::Payload(err) => ApiError::internal(
            codes::INTERNAL,
            "Failed to send notifications",
            err.to_string(),
        ),
    }
}
