use serde::{Deserialize, Serialize};

use crate::application::notify::{Announcement, DispatchOutcome};

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UnsubscribeRequest {
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotifyRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

impl From<NotifyRequest> for Announcement {
    fn from(request: NotifyRequest) -> Self {
        Self {
            title: request.title.unwrap_or_default(),
            body: request.body.unwrap_or_default(),
            url: request.url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub success: bool,
    pub notifications_sent: usize,
    pub total_subscribers: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<DispatchOutcome> for NotifyResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            success: true,
            notifications_sent: outcome.sent,
            total_subscribers: outcome.total,
            errors: outcome.errors,
        }
    }
}
