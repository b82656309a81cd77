//! Page models for the public report pages.

use std::sync::Arc;

use thiserror::Error;

use crate::application::markdown::{MarkdownRenderer, RenderError};
use crate::application::repos::ReportsRepo;
use crate::domain::reports::Report;
use crate::domain::week::{format_display_date, format_timestamp};
use crate::presentation::views::{
    ArchiveView, FeatureView, HomeView, ReportCard, ReportDetailView, ReportLink,
};

/// Reports shown in full on the home page: the latest plus three previous.
const HOME_REPORTS: usize = 4;

#[derive(Debug, Error)]
pub enum ReportPageError {
    #[error("report `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Clone)]
pub struct ReportService {
    repo: Arc<dyn ReportsRepo>,
    renderer: Arc<MarkdownRenderer>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportsRepo>, renderer: Arc<MarkdownRenderer>) -> Self {
        Self { repo, renderer }
    }

    pub async fn home(&self) -> HomeView {
        let reports = self.repo.list_reports().await;
        let show_view_all = reports.len() > HOME_REPORTS;

        let mut cards = reports.iter().take(HOME_REPORTS).map(report_card);
        let latest = cards.next();
        let previous = cards.collect();

        HomeView {
            latest,
            previous,
            show_view_all,
            features: features(),
        }
    }

    pub async fn report(&self, week: &str) -> Result<ReportDetailView, ReportPageError> {
        let neighbours = self
            .repo
            .neighbours(week)
            .await
            .ok_or_else(|| ReportPageError::NotFound(week.to_string()))?;
        let report = neighbours.current;
        let content_html = self.renderer.render(&report.content)?;

        Ok(ReportDetailView {
            published: format_display_date(report.published_at),
            iso_date: format_timestamp(report.published_at),
            previous: neighbours.previous.as_ref().map(report_link),
            next: neighbours.next.as_ref().map(report_link),
            week: report.week,
            title: report.title,
            excerpt: report.excerpt,
            content_html,
        })
    }

    pub async fn archive(&self) -> ArchiveView {
        let reports: Vec<ReportCard> = self.repo.list_reports().await.iter().map(report_card).collect();
        ArchiveView {
            total: reports.len(),
            reports,
        }
    }
}

pub fn report_path(week: &str) -> String {
    format!("/blog/{week}")
}

fn report_card(report: &Report) -> ReportCard {
    ReportCard {
        week: report.week.clone(),
        href: report_path(&report.week),
        title: report.title.clone(),
        excerpt: report.excerpt.clone(),
        iso_date: format_timestamp(report.published_at),
        published: format_display_date(report.published_at),
    }
}

fn report_link(report: &Report) -> ReportLink {
    ReportLink {
        href: report_path(&report.week),
        title: report.title.clone(),
    }
}

fn features() -> Vec<FeatureView> {
    vec![
        FeatureView {
            icon: "📈",
            title: "Trending Repositories",
            description: "The most-starred React projects on GitHub, collected every week.",
        },
        FeatureView {
            icon: "📚",
            title: "Library Updates",
            description: "Picks from the curated awesome-react list, grouped by category.",
        },
        FeatureView {
            icon: "🔔",
            title: "Push Notifications",
            description: "Subscribe once and get a browser notification for every new report.",
        },
    ]
}
