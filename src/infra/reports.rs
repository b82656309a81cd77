//! Markdown reports stored as `<week>.md` files in one directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::warn;

use crate::application::repos::{RepoError, ReportsRepo};
use crate::domain::reports::{Report, order_reports};
use crate::domain::week::is_valid_week_identifier;

const REPORT_EXTENSION: &str = "md";

pub struct FsReportRepository {
    dir: PathBuf,
}

impl FsReportRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Markdown files in the directory, sorted by file name.
    async fn report_files(&self) -> Vec<PathBuf> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    target = "weekly_trends::reports",
                    dir = %self.dir.display(),
                    error = %err,
                    "reports directory is unreadable"
                );
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.extension().is_some_and(|ext| ext == REPORT_EXTENSION) {
                        files.push(path);
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(
                        target = "weekly_trends::reports",
                        dir = %self.dir.display(),
                        error = %err,
                        "failed to list reports directory"
                    );
                    break;
                }
            }
        }
        files.sort();
        files
    }

    async fn load(path: &Path) -> Option<Report> {
        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(err) => {
                warn!(
                    target = "weekly_trends::reports",
                    path = %path.display(),
                    error = %err,
                    "failed to read report"
                );
                return None;
            }
        };

        match Report::parse(&source) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(
                    target = "weekly_trends::reports",
                    path = %path.display(),
                    error = %err,
                    "skipping invalid report"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ReportsRepo for FsReportRepository {
    async fn list_reports(&self) -> Vec<Report> {
        let mut reports = Vec::new();
        for path in self.report_files().await {
            if let Some(report) = Self::load(&path).await {
                reports.push(report);
            }
        }

        let (reports, duplicates) = order_reports(reports);
        for duplicate in duplicates {
            warn!(
                target = "weekly_trends::reports",
                week = %duplicate.week,
                "duplicate week identifier, keeping the first file"
            );
        }
        reports
    }

    async fn write_report(&self, week: &str, markdown: &str) -> Result<PathBuf, RepoError> {
        if !is_valid_week_identifier(week) {
            return Err(RepoError::invalid_input(format!(
                "`{week}` is not a valid week identifier"
            )));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(RepoError::from_persistence)?;

        let path = self.dir.join(format!("{week}.{REPORT_EXTENSION}"));
        tokio::fs::write(&path, markdown)
            .await
            .map_err(RepoError::from_persistence)?;
        Ok(path)
    }
}
