use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use weekly_trends::application::markdown::markdown_renderer;
use weekly_trends::application::reports::{ReportPageError, ReportService};
use weekly_trends::application::repos::ReportsRepo;
use weekly_trends::infra::reports::FsReportRepository;

fn write_report(dir: &Path, file: &str, week: &str, date: &str, body: &str) {
    let source = format!(
        "---\ntitle: \"React Weekly Trends - {week}\"\nweek: \"{week}\"\ndate: \"{date}\"\n---\n\n{body}\n"
    );
    std::fs::write(dir.join(file), source).expect("write report");
}

fn seeded(count: usize) -> (TempDir, FsReportRepository) {
    let dir = TempDir::new().expect("tempdir");
    for week in 1..=count {
        let date = format!("2025-{week:02}-01");
        write_report(
            dir.path(),
            &format!("2025-week-{week}.md"),
            &format!("2025-week-{week}"),
            &date,
            &format!("# Week {week}\n\nHighlights for week {week}."),
        );
    }
    let repo = FsReportRepository::new(dir.path());
    (dir, repo)
}

fn service(repo: FsReportRepository) -> ReportService {
    ReportService::new(Arc::new(repo), markdown_renderer())
}

#[tokio::test]
async fn reports_are_listed_newest_first() {
    let dir = TempDir::new().expect("tempdir");
    write_report(dir.path(), "2025-week-1.md", "2025-week-1", "2025-01-01", "Older.");
    write_report(dir.path(), "2025-week-2.md", "2025-week-2", "2025-01-08", "Newer.");

    let repo = FsReportRepository::new(dir.path());
    let weeks: Vec<_> = repo
        .list_reports()
        .await
        .into_iter()
        .map(|report| report.week)
        .collect();

    assert_eq!(weeks, vec!["2025-week-2", "2025-week-1"]);
}

#[tokio::test]
async fn invalid_and_foreign_files_are_skipped() {
    let (dir, repo) = seeded(1);
    std::fs::write(
        dir.path().join("no-week.md"),
        "---\ntitle: \"Missing week\"\ndate: \"2025-02-01\"\n---\nBody",
    )
    .expect("write");
    std::fs::write(dir.path().join("notes.txt"), "not a report").expect("write");
    std::fs::write(dir.path().join("broken.md"), "no frontmatter at all").expect("write");

    let reports = repo.list_reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].week, "2025-week-1");
}

#[tokio::test]
async fn missing_directory_lists_as_empty() {
    let dir = TempDir::new().expect("tempdir");
    let repo = FsReportRepository::new(dir.path().join("does-not-exist"));

    assert!(repo.list_reports().await.is_empty());
    assert!(repo.latest_report().await.is_none());
}

#[tokio::test]
async fn duplicate_weeks_keep_the_first_file() {
    let dir = TempDir::new().expect("tempdir");
    write_report(dir.path(), "a.md", "2025-week-3", "2025-01-15", "First copy.");
    write_report(dir.path(), "b.md", "2025-week-3", "2025-01-16", "Second copy.");

    let repo = FsReportRepository::new(dir.path());
    let reports = repo.list_reports().await;

    assert_eq!(reports.len(), 1);
    assert!(reports[0].content.contains("First copy."));
}

#[tokio::test]
async fn write_report_creates_directory_and_rejects_bad_weeks() {
    let dir = TempDir::new().expect("tempdir");
    let repo = FsReportRepository::new(dir.path().join("nested").join("posts"));

    let path = repo
        .write_report("2025-week-9", "---\ntitle: t\nweek: 2025-week-9\ndate: 2025-02-26\n---\nBody")
        .await
        .expect("write report");
    assert!(path.ends_with("2025-week-9.md"));
    assert!(path.exists());

    assert!(repo.write_report("../escape", "body").await.is_err());
}

#[tokio::test]
async fn home_shows_latest_three_previous_and_view_all() {
    let (_dir, repo) = seeded(4);
    let home = service(repo).home().await;

    let latest = home.latest.expect("latest report");
    assert_eq!(latest.week, "2025-week-4");
    assert_eq!(latest.href, "/blog/2025-week-4");
    assert_eq!(home.previous.len(), 3);
    assert!(!home.show_view_all);
    assert_eq!(home.features.len(), 3);

    let (_dir, repo) = seeded(5);
    let home = service(repo).home().await;
    assert_eq!(home.previous.len(), 3);
    assert!(home.show_view_all);
}

#[tokio::test]
async fn home_without_reports_has_no_latest() {
    let dir = TempDir::new().expect("tempdir");
    let home = service(FsReportRepository::new(dir.path())).home().await;

    assert!(home.latest.is_none());
    assert!(home.previous.is_empty());
    assert!(!home.show_view_all);
}

#[tokio::test]
async fn report_page_links_older_and_newer_reports() {
    let (_dir, repo) = seeded(3);
    let detail = service(repo).report("2025-week-2").await.expect("report");

    assert_eq!(detail.title, "React Weekly Trends - 2025-week-2");
    assert_eq!(detail.published, "February 1, 2025");
    assert!(detail.content_html.contains("<h1>Week 2</h1>"));
    assert_eq!(
        detail.previous.map(|link| link.href).as_deref(),
        Some("/blog/2025-week-1")
    );
    assert_eq!(
        detail.next.map(|link| link.href).as_deref(),
        Some("/blog/2025-week-3")
    );
}

#[tokio::test]
async fn unknown_week_is_not_found() {
    let (_dir, repo) = seeded(1);
    let err = service(repo)
        .report("2030-week-1")
        .await
        .expect_err("missing report");

    assert!(matches!(err, ReportPageError::NotFound(week) if week == "2030-week-1"));
}

#[tokio::test]
async fn archive_lists_every_report() {
    let (_dir, repo) = seeded(6);
    let archive = service(repo).archive().await;

    assert_eq!(archive.total, 6);
    assert_eq!(archive.reports[0].week, "2025-week-6");
    assert_eq!(archive.reports[5].week, "2025-week-1");
}
