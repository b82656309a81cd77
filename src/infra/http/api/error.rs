use crate::application::error::ErrorReport;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const NOT_CONFIGURED: &str = "push_not_configured";
    pub const REPO: &str = "repo_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, codes::DUPLICATE, message, None)
    }

    pub fn not_configured(message: &'static str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::NOT_CONFIGURED,
            message,
            Some("set VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY".to_string()),
        )
    }

    pub fn internal(code: &'static str, message: &'static str, detail: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message, Some(detail))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!(
            "{}: {}",
            self.code,
            self.hint.as_deref().unwrap_or(self.message)
        );
        // Internal details go to the log, not to the client.
        let hint = if self.status.is_server_error() {
            None
        } else {
            self.hint
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message("infra::http::api", self.status, detail).attach(&mut response);
        response
    }
}
