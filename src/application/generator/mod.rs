//! Weekly report generation.
//!
//! The job fetches trending repositories and a curated library list, writes one
//! markdown report for the current ISO week, and can announce it to subscribers.
//! Upstream failures are retried and then replaced by fixed mock data unless the
//! fallback is disabled.

pub mod awesome;
pub mod compose;
pub mod mock;
pub mod retry;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::application::notify::{Announcement, DispatchOutcome, NotifyService};
use crate::application::repos::{RepoError, ReportsRepo};
use crate::domain::week::week_identifier;

use self::awesome::parse_awesome_list;
use self::compose::compose_report;
use self::mock::{mock_libraries, mock_repositories};
use self::retry::{RetryConfig, is_retryable_status, with_retry};

pub const NOTIFICATION_TITLE: &str = "📰 New React Weekly Trends Report Available!";

/// Repository entry as returned by the GitHub search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrendingRepository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: String,
    pub html_url: String,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    pub url: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no GitHub token configured")]
    MissingToken,
    #[error("upstream answered with status {status}")]
    Status { status: u16 },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Status { status } => is_retryable_status(*status),
            UpstreamError::Transport(_) => true,
            UpstreamError::MissingToken
            | UpstreamError::Decode(_)
            | UpstreamError::InvalidRequest(_) => false,
        }
    }
}

/// Where the generator gets its ecosystem data from.
#[async_trait]
pub trait EcosystemSource: Send + Sync {
    async fn trending_repositories(&self) -> Result<Vec<TrendingRepository>, UpstreamError>;

    /// Raw markdown of the curated awesome-list README.
    async fn awesome_readme(&self) -> Result<String, UpstreamError>;
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to fetch {source_name}")]
    Upstream {
        source_name: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("failed to write report")]
    Write(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub retry: RetryConfig,
    pub fallback_to_mock: bool,
    pub send_notifications: bool,
    /// Public site root used in notification links, without trailing slash.
    pub site_base_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            fallback_to_mock: true,
            send_notifications: false,
            site_base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GeneratedReport {
    pub week: String,
    pub path: PathBuf,
    pub repositories: usize,
    pub libraries: usize,
    /// Present when notifications were requested and dispatch ran.
    pub notification: Option<DispatchOutcome>,
}

pub struct ReportGenerator {
    source: Arc<dyn EcosystemSource>,
    reports: Arc<dyn ReportsRepo>,
    notifier: Option<Arc<NotifyService>>,
    config: GeneratorConfig,
}

impl ReportGenerator {
    pub fn new(
        source: Arc<dyn EcosystemSource>,
        reports: Arc<dyn ReportsRepo>,
        notifier: Option<Arc<NotifyService>>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            source,
            reports,
            notifier,
            config,
        }
    }

    pub async fn run(&self, now: OffsetDateTime) -> Result<GeneratedReport, GeneratorError> {
        info!(target = "weekly_trends::generator", "fetching trending repositories");
        let repositories = self.fetch_repositories(now).await?;

        info!(target = "weekly_trends::generator", "fetching awesome-react libraries");
        let libraries = self.fetch_libraries().await?;

        let week = week_identifier(now);
        let markdown = compose_report(&week, now, &repositories, &libraries);
        let path = self.reports.write_report(&week, &markdown).await?;

        info!(
            target = "weekly_trends::generator",
            week = %week,
            path = %path.display(),
            repositories = repositories.len(),
            libraries = libraries.len(),
            "report generated"
        );

        let notification = if self.config.send_notifications {
            self.announce(&week).await
        } else {
            None
        };

        Ok(GeneratedReport {
            week,
            path,
            repositories: repositories.len(),
            libraries: libraries.len(),
            notification,
        })
    }

    async fn fetch_repositories(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<TrendingRepository>, GeneratorError> {
        let result = with_retry(&self.config.retry, UpstreamError::is_retryable, || {
            self.source.trending_repositories()
        })
        .await;

        match result {
            Ok(repositories) => Ok(repositories),
            Err(UpstreamError::MissingToken) => {
                warn!(
                    target = "weekly_trends::generator",
                    "no GitHub token provided, using mock repositories"
                );
                Ok(mock_repositories(now))
            }
            Err(err) => self.fallback("trending repositories", err, || mock_repositories(now)),
        }
    }

    async fn fetch_libraries(&self) -> Result<Vec<LibraryEntry>, GeneratorError> {
        let result = with_retry(&self.config.retry, UpstreamError::is_retryable, || {
            self.source.awesome_readme()
        })
        .await;

        match result {
            Ok(readme) => Ok(parse_awesome_list(&readme)),
            Err(err) => self.fallback("awesome-react libraries", err, mock_libraries),
        }
    }

    fn fallback<T>(
        &self,
        source_name: &'static str,
        err: UpstreamError,
        mock: impl FnOnce() -> T,
    ) -> Result<T, GeneratorError> {
        if !self.config.fallback_to_mock {
            return Err(GeneratorError::Upstream {
                source_name,
                source: err,
            });
        }

        warn!(
            target = "weekly_trends::generator",
            source = source_name,
            error = %err,
            "upstream unavailable, using mock data"
        );
        Ok(mock())
    }

    async fn announce(&self, week: &str) -> Option<DispatchOutcome> {
        let Some(notifier) = self.notifier.as_ref() else {
            warn!(
                target = "weekly_trends::generator",
                "notifications requested but push is not configured"
            );
            return None;
        };

        let announcement = Announcement {
            title: NOTIFICATION_TITLE.to_string(),
            body: format!(
                "Check out the latest trends and updates in the React ecosystem for week {week}"
            ),
            url: Some(format!(
                "{}/blog/{week}",
                self.config.site_base_url.trim_end_matches('/')
            )),
        };

        match notifier.announce(&announcement).await {
            Ok(outcome) => {
                info!(
                    target = "weekly_trends::generator",
                    sent = outcome.sent,
                    total = outcome.total,
                    "notifications sent"
                );
                Some(outcome)
            }
            Err(err) => {
                error!(
                    target = "weekly_trends::generator",
                    error = %err,
                    "failed to send notifications"
                );
                None
            }
        }
    }
}
