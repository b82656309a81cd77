//! Push notification fan-out.
//!
//! [`NotificationDispatcher`] delivers one message to every stored subscription
//! and reports what happened; it never edits the store. [`NotifyService`] is the
//! caller-side policy that prunes subscriptions the push service reported as gone.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::application::repos::SubscriptionsRepo;
use crate::domain::{error::DomainError, subscriptions::Subscription};

pub const NOTIFICATION_ICON: &str = "/favicon.ico";
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure delivering a single message to a single subscription.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The push service no longer knows this subscription (HTTP 404 or 410).
    #[error("endpoint gone (status {status})")]
    Gone { status: u16 },
    #[error("push service rejected the message: {0}")]
    Rejected(String),
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

impl DeliveryError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, DeliveryError::Gone { .. })
    }
}

/// Transport that encrypts and posts a payload to one subscription's endpoint.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn deliver(&self, subscription: &Subscription, payload: &[u8])
    -> Result<(), DeliveryError>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("push notifications are not configured")]
    NotConfigured,
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("failed to encode notification payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Message to announce to every subscriber.
#[derive(Debug, Clone, Default)]
pub struct Announcement {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    title: &'a str,
    body: &'a str,
    icon: &'a str,
    badge: &'a str,
    url: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub total: usize,
    pub errors: Vec<String>,
    /// Endpoints the push service reported as permanently gone.
    pub stale_endpoints: Vec<String>,
    /// Stale endpoints removed from the store afterwards, if the caller reconciled.
    pub pruned: usize,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub concurrency: usize,
    pub timeout: Duration,
    /// Click-through target when an announcement carries no URL.
    pub default_url: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            default_url: "http://localhost:3000".to_string(),
        }
    }
}

pub struct NotificationDispatcher {
    subscriptions: Arc<dyn SubscriptionsRepo>,
    transport: Option<Arc<dyn PushTransport>>,
    config: DispatcherConfig,
}

impl NotificationDispatcher {
    /// A `None` transport means no VAPID credentials were configured.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionsRepo>,
        transport: Option<Arc<dyn PushTransport>>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            subscriptions,
            transport,
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn dispatch(
        &self,
        announcement: &Announcement,
    ) -> Result<DispatchOutcome, DispatchError> {
        if announcement.title.trim().is_empty() || announcement.body.trim().is_empty() {
            return Err(DomainError::validation("title and body are required").into());
        }

        let Some(transport) = self.transport.as_ref() else {
            return Err(DispatchError::NotConfigured);
        };

        let url = announcement
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.config.default_url);
        let payload: Arc<[u8]> = serde_json::to_vec(&PushPayload {
            title: &announcement.title,
            body: &announcement.body,
            icon: NOTIFICATION_ICON,
            badge: NOTIFICATION_ICON,
            url,
        })?
        .into();

        let subscriptions = self.subscriptions.list_subscriptions().await;
        let total = subscriptions.len();
        if total == 0 {
            return Ok(DispatchOutcome::default());
        }

        let limit = self.config.timeout;
        let results: Vec<(String, Result<(), DeliveryError>)> = stream::iter(subscriptions)
            .map(|subscription| {
                let transport = Arc::clone(transport);
                let payload = Arc::clone(&payload);
                async move {
                    let result =
                        match timeout(limit, transport.deliver(&subscription, &payload)).await {
                            Ok(result) => result,
                            Err(_) => Err(DeliveryError::Timeout(limit)),
                        };
                    (subscription.endpoint, result)
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut outcome = DispatchOutcome {
            total,
            ..DispatchOutcome::default()
        };

        for (endpoint, result) in results {
            match result {
                Ok(()) => outcome.sent += 1,
                Err(err) => {
                    warn!(
                        target = "weekly_trends::notify",
                        endpoint = %endpoint,
                        error = %err,
                        "push delivery failed"
                    );
                    outcome.errors.push(format!("Failed to send to {endpoint}"));
                    if err.is_permanent() {
                        outcome.stale_endpoints.push(endpoint);
                    }
                }
            }
        }

        counter!("weekly_trends_push_sent_total").increment(outcome.sent as u64);
        counter!("weekly_trends_push_failed_total").increment(outcome.errors.len() as u64);
        info!(
            target = "weekly_trends::notify",
            sent = outcome.sent,
            total = outcome.total,
            failed = outcome.errors.len(),
            stale = outcome.stale_endpoints.len(),
            "push fan-out finished"
        );

        Ok(outcome)
    }
}

/// Dispatch plus reconciliation of stale subscriptions.
pub struct NotifyService {
    dispatcher: Arc<NotificationDispatcher>,
    subscriptions: Arc<dyn SubscriptionsRepo>,
    prune_stale: bool,
}

impl NotifyService {
    pub fn new(
        dispatcher: Arc<NotificationDispatcher>,
        subscriptions: Arc<dyn SubscriptionsRepo>,
        prune_stale: bool,
    ) -> Self {
        Self {
            dispatcher,
            subscriptions,
            prune_stale,
        }
    }

    pub async fn announce(
        &self,
        announcement: &Announcement,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut outcome = self.dispatcher.dispatch(announcement).await?;

        if self.prune_stale && !outcome.stale_endpoints.is_empty() {
            match self
                .subscriptions
                .remove_subscriptions(&outcome.stale_endpoints)
                .await
            {
                Ok(removed) => {
                    outcome.pruned = removed;
                    counter!("weekly_trends_subscriptions_pruned_total").increment(removed as u64);
                    info!(
                        target = "weekly_trends::notify",
                        removed,
                        "pruned stale subscriptions"
                    );
                }
                Err(err) => {
                    warn!(
                        target = "weekly_trends::notify",
                        error = %err,
                        "failed to prune stale subscriptions"
                    );
                }
            }
        }

        Ok(outcome)
    }
}
