use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use time::macros::datetime;
use weekly_trends::application::generator::retry::RetryConfig;
use weekly_trends::application::generator::{
    EcosystemSource, GeneratorConfig, GeneratorError, ReportGenerator, TrendingRepository,
    UpstreamError,
};
use weekly_trends::application::notify::{
    DeliveryError, DispatcherConfig, NotificationDispatcher, NotifyService, PushTransport,
};
use weekly_trends::application::repos::{ReportsRepo, SubscriptionsRepo};
use weekly_trends::domain::reports::Report;
use weekly_trends::domain::subscriptions::Subscription;
use weekly_trends::infra::reports::FsReportRepository;
use weekly_trends::infra::subscriptions::JsonSubscriptionStore;

const README: &str = "\
# Awesome React

## State Management
- [Zustand](https://github.com/pmndrs/zustand) - Bear necessities for state management
- [Docs site](https://zustand.docs.pmnd.rs) - Not hosted on GitHub

## Testing
- [Testing Library](https://github.com/testing-library/react-testing-library) - Simple testing utilities
";

#[derive(Clone, Copy)]
enum Trending {
    Ok,
    MissingToken,
    /// Fail with this status on every call.
    Status(u16),
    /// Fail with 503 this many times, then succeed.
    FlakyThenOk(usize),
}

struct ScriptedSource {
    trending: Trending,
    readme_ok: bool,
    trending_calls: AtomicUsize,
    readme_calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(trending: Trending, readme_ok: bool) -> Self {
        Self {
            trending,
            readme_ok,
            trending_calls: AtomicUsize::new(0),
            readme_calls: AtomicUsize::new(0),
        }
    }
}

fn repository(name: &str, stars: u64) -> TrendingRepository {
    TrendingRepository {
        name: name.to_string(),
        full_name: format!("example/{name}"),
        description: Some(format!("{name} description")),
        stargazers_count: stars,
        forks_count: 1_234,
        language: Some("TypeScript".to_string()),
        updated_at: "2025-11-20T10:00:00Z".to_string(),
        html_url: format!("https://github.com/example/{name}"),
        homepage: None,
    }
}

#[async_trait]
impl EcosystemSource for ScriptedSource {
    async fn trending_repositories(&self) -> Result<Vec<TrendingRepository>, UpstreamError> {
        let call = self.trending_calls.fetch_add(1, Ordering::SeqCst);
        match self.trending {
            Trending::Ok => Ok(vec![repository("live-one", 123_456)]),
            Trending::MissingToken => Err(UpstreamError::MissingToken),
            Trending::Status(status) => Err(UpstreamError::Status { status }),
            Trending::FlakyThenOk(failures) if call < failures => {
                Err(UpstreamError::Status { status: 503 })
            }
            Trending::FlakyThenOk(_) => Ok(vec![repository("recovered", 42)]),
        }
    }

    async fn awesome_readme(&self) -> Result<String, UpstreamError> {
        self.readme_calls.fetch_add(1, Ordering::SeqCst);
        if self.readme_ok {
            Ok(README.to_string())
        } else {
            Err(UpstreamError::Transport("connection reset".to_string()))
        }
    }
}

#[derive(Default)]
struct RecordingTransport {
    delivered: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        let payload = serde_json::from_slice(payload).expect("payload is json");
        self.delivered
            .lock()
            .expect("lock")
            .push((subscription.endpoint.clone(), payload));
        Ok(())
    }
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay_ms: 10,
        max_delay_ms: 20,
        backoff_multiplier: 2.0,
    }
}

fn config(fallback_to_mock: bool) -> GeneratorConfig {
    GeneratorConfig {
        retry: fast_retry(),
        fallback_to_mock,
        send_notifications: false,
        site_base_url: "https://trends.example.com".to_string(),
    }
}

async fn read_back(path: &std::path::Path) -> Report {
    let source = tokio::fs::read_to_string(path).await.expect("report written");
    Report::parse(&source).expect("generated report parses")
}

#[tokio::test(start_paused = true)]
async fn writes_report_for_the_current_week() {
    let dir = TempDir::new().expect("tempdir");
    let reports = Arc::new(FsReportRepository::new(dir.path()));
    let source = Arc::new(ScriptedSource::new(Trending::Ok, true));
    let generator = ReportGenerator::new(source, reports.clone(), None, config(true));

    let generated = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("generation succeeds");

    assert_eq!(generated.week, "2025-week-48");
    assert_eq!(generated.repositories, 1);
    assert_eq!(generated.libraries, 2);
    assert!(generated.notification.is_none());

    let report = read_back(&generated.path).await;
    assert_eq!(report.week, "2025-week-48");
    assert_eq!(report.title, "React Weekly Trends - November 27, 2025");
    assert!(report.content.contains("[live-one](https://github.com/example/live-one)"));
    assert!(report.content.contains("⭐ 123,456"));
    assert!(report.content.contains("### **Zustand** - State Management"));
    assert!(!report.content.contains("Docs site"));

    let listed = reports.list_reports().await;
    assert_eq!(listed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_token_uses_mock_repositories_without_retrying() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(ScriptedSource::new(Trending::MissingToken, true));
    let generator = ReportGenerator::new(
        source.clone(),
        Arc::new(FsReportRepository::new(dir.path())),
        None,
        config(false),
    );

    let generated = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("mock data is used even with fallback disabled");

    assert_eq!(source.trending_calls.load(Ordering::SeqCst), 1);
    assert_eq!(generated.repositories, 3);
    let report = read_back(&generated.path).await;
    assert!(report.content.contains("## 📈 Trending React Repositories"));
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(ScriptedSource::new(Trending::FlakyThenOk(2), true));
    let generator = ReportGenerator::new(
        source.clone(),
        Arc::new(FsReportRepository::new(dir.path())),
        None,
        config(false),
    );

    let generated = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("third attempt succeeds");

    assert_eq!(source.trending_calls.load(Ordering::SeqCst), 3);
    let report = read_back(&generated.path).await;
    assert!(report.content.contains("recovered"));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_fall_back_to_mock_data() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(ScriptedSource::new(Trending::Status(502), false));
    let generator = ReportGenerator::new(
        source.clone(),
        Arc::new(FsReportRepository::new(dir.path())),
        None,
        config(true),
    );

    let generated = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("fallback keeps the job alive");

    assert_eq!(source.trending_calls.load(Ordering::SeqCst), 3);
    assert_eq!(source.readme_calls.load(Ordering::SeqCst), 3);
    assert_eq!(generated.repositories, 3);
    assert_eq!(generated.libraries, 3);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_status_is_not_retried() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(ScriptedSource::new(Trending::Status(401), true));
    let generator = ReportGenerator::new(
        source.clone(),
        Arc::new(FsReportRepository::new(dir.path())),
        None,
        config(true),
    );

    generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("fallback to mock");

    assert_eq!(source.trending_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_fallback_aborts_without_writing() {
    let dir = TempDir::new().expect("tempdir");
    let source = Arc::new(ScriptedSource::new(Trending::Status(500), true));
    let reports = Arc::new(FsReportRepository::new(dir.path()));
    let generator = ReportGenerator::new(source, reports.clone(), None, config(false));

    let err = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect_err("upstream failure is fatal");

    assert!(matches!(
        err,
        GeneratorError::Upstream {
            source: UpstreamError::Status { status: 500 },
            ..
        }
    ));
    assert!(reports.list_reports().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn announces_new_report_to_subscribers() {
    let dir = TempDir::new().expect("tempdir");
    let subscriptions: Arc<dyn SubscriptionsRepo> =
        Arc::new(JsonSubscriptionStore::new(dir.path().join("subscriptions.json")));
    subscriptions
        .add_subscription(Subscription::new("https://push.example.com/a", "p", "a"))
        .await
        .expect("add");

    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = NotificationDispatcher::new(
        subscriptions.clone(),
        Some(transport.clone() as Arc<dyn PushTransport>),
        DispatcherConfig::default(),
    );
    let notifier = Arc::new(NotifyService::new(
        Arc::new(dispatcher),
        subscriptions,
        true,
    ));

    let generator = ReportGenerator::new(
        Arc::new(ScriptedSource::new(Trending::Ok, true)),
        Arc::new(FsReportRepository::new(dir.path().join("posts"))),
        Some(notifier),
        GeneratorConfig {
            send_notifications: true,
            ..config(true)
        },
    );

    let generated = generator
        .run(datetime!(2025-11-27 09:30 UTC))
        .await
        .expect("generation succeeds");

    let outcome = generated.notification.expect("notification outcome");
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.total, 1);

    let delivered = transport.delivered.lock().expect("lock");
    assert_eq!(delivered.len(), 1);
    let (endpoint, payload) = &delivered[0];
    assert_eq!(endpoint, "https://push.example.com/a");
    assert_eq!(
        payload["title"].as_str(),
        Some("📰 New React Weekly Trends Report Available!")
    );
    assert_eq!(
        payload["url"].as_str(),
        Some("https://trends.example.com/blog/2025-week-48")
    );
    assert!(
        payload["body"]
            .as_str()
            .is_some_and(|body| body.contains("2025-week-48"))
    );
}
