//! Repository traits describing persistence adapters.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    reports::{Report, ReportNeighbours, locate_with_neighbours},
    subscriptions::Subscription,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Push subscriptions keyed by endpoint.
///
/// Reads fail soft: an absent or unreadable backing store lists as empty.
/// Writes report their failures.
#[async_trait]
pub trait SubscriptionsRepo: Send + Sync {
    async fn list_subscriptions(&self) -> Vec<Subscription>;

    /// Returns `false` without touching the store when the endpoint is already present.
    async fn add_subscription(&self, subscription: Subscription) -> Result<bool, RepoError>;

    /// Returns `false` when no subscription has this endpoint.
    async fn remove_subscription(&self, endpoint: &str) -> Result<bool, RepoError>;

    /// Remove every listed endpoint in a single write; returns how many were removed.
    async fn remove_subscriptions(&self, endpoints: &[String]) -> Result<usize, RepoError>;
}

/// Weekly reports, newest first.
#[async_trait]
pub trait ReportsRepo: Send + Sync {
    /// All valid reports sorted by date, newest first. Fails soft to an empty list.
    async fn list_reports(&self) -> Vec<Report>;

    async fn latest_report(&self) -> Option<Report> {
        self.list_reports().await.into_iter().next()
    }

    async fn find_report(&self, week: &str) -> Option<Report> {
        self.list_reports()
            .await
            .into_iter()
            .find(|report| report.week == week)
    }

    async fn neighbours(&self, week: &str) -> Option<ReportNeighbours> {
        locate_with_neighbours(self.list_reports().await, week)
    }

    /// Persist a generated report document under its week identifier.
    async fn write_report(&self, week: &str, markdown: &str) -> Result<PathBuf, RepoError>;
}
