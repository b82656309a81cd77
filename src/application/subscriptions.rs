use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::info;

use crate::application::repos::{RepoError, SubscriptionsRepo};
use crate::domain::{
    error::DomainError,
    subscriptions::{SubscriptionDraft, validate_endpoint},
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("subscription already exists")]
    AlreadySubscribed,
    #[error("subscription not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionsRepo>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionsRepo>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(&self, draft: SubscriptionDraft) -> Result<(), SubscriptionError> {
        let subscription = draft.validate()?;
        let endpoint = subscription.endpoint.clone();

        if !self.repo.add_subscription(subscription).await? {
            return Err(SubscriptionError::AlreadySubscribed);
        }

        counter!("weekly_trends_subscriptions_added_total").increment(1);
        info!(
            target = "weekly_trends::subscriptions",
            endpoint = %endpoint,
            "subscription added"
        );
        Ok(())
    }

    pub async fn unsubscribe(&self, endpoint: &str) -> Result<(), SubscriptionError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(DomainError::validation("`endpoint` is required").into());
        }
        validate_endpoint(endpoint)?;

        if !self.repo.remove_subscription(endpoint).await? {
            return Err(SubscriptionError::NotFound);
        }

        counter!("weekly_trends_subscriptions_removed_total").increment(1);
        info!(
            target = "weekly_trends::subscriptions",
            endpoint = %endpoint,
            "subscription removed"
        );
        Ok(())
    }
}
