//! Browser push subscriptions.
//!
//! A subscription is identified by its push-service endpoint. The two keys are
//! opaque base64url strings handed out by the browser and are only consumed by
//! the payload encryption step.

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl Subscription {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }
}

/// Subscription payload as posted by a browser, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionDraft {
    pub endpoint: Option<String>,
    pub keys: Option<SubscriptionKeysDraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionKeysDraft {
    pub p256dh: Option<String>,
    pub auth: Option<String>,
}

impl SubscriptionDraft {
    /// Check that every required field is present and the endpoint is an absolute
    /// http(s) URL.
    pub fn validate(self) -> Result<Subscription, DomainError> {
        let endpoint = required(self.endpoint, "endpoint")?;
        validate_endpoint(&endpoint)?;

        let keys = self
            .keys
            .ok_or_else(|| DomainError::validation("`keys` is required"))?;
        let p256dh = required(keys.p256dh, "keys.p256dh")?;
        let auth = required(keys.auth, "keys.auth")?;

        Ok(Subscription::new(endpoint, p256dh, auth))
    }
}

/// Validate an endpoint supplied on its own, e.g. for unsubscribe requests.
pub fn validate_endpoint(endpoint: &str) -> Result<(), DomainError> {
    let url = Url::parse(endpoint)
        .map_err(|err| DomainError::validation(format!("`endpoint` is not a valid URL: {err}")))?;

    match url.scheme() {
        "https" | "http" => Ok(()),
        other => Err(DomainError::validation(format!(
            "`endpoint` must use http or https, got `{other}`"
        ))),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DomainError::validation(format!("`{field}` is required"))),
    }
}
