use std::{future::IntoFuture, process, sync::Arc};

use time::OffsetDateTime;
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use weekly_trends::{
    application::{
        error::AppError,
        generator::{GeneratorConfig, ReportGenerator},
        markdown::markdown_renderer,
        notify::{DispatcherConfig, NotificationDispatcher, NotifyService, PushTransport},
        reports::ReportService,
        repos::{ReportsRepo, SubscriptionsRepo},
        subscriptions::SubscriptionService,
    },
    config,
    infra::{
        error::InfraError,
        github::GithubSource,
        http::{self, AdminState, ApiState, HttpState, RouterState},
        push::WebPushTransport,
        reports::FsReportRepository,
        subscriptions::JsonSubscriptionStore,
        telemetry,
    },
    presentation::views::LayoutChrome,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Generate(_) => run_generate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let subscriptions: Arc<dyn SubscriptionsRepo> = Arc::new(JsonSubscriptionStore::new(
        settings.storage.subscriptions_file.clone(),
    ));
    let reports: Arc<dyn ReportsRepo> =
        Arc::new(FsReportRepository::new(settings.storage.reports_dir.clone()));

    let notify = build_notify_service(&settings, subscriptions.clone())?;
    if settings.push.vapid.is_none() {
        warn!(
            target = "weekly_trends::startup",
            "VAPID keys are not configured; push subscriptions and notifications are disabled"
        );
    }

    let chrome = LayoutChrome::for_site(
        &settings.site.title,
        &settings.site.description,
        &settings.site.base_url,
    );

    let router_state = RouterState {
        http: HttpState {
            reports: Arc::new(ReportService::new(reports, markdown_renderer())),
            chrome: Arc::new(chrome),
        },
        api: ApiState {
            subscriptions: Arc::new(SubscriptionService::new(subscriptions)),
            vapid_public_key: settings
                .push
                .vapid
                .as_ref()
                .map(|vapid| Arc::from(vapid.public_key.as_str())),
        },
    };
    let admin_state = AdminState { notify };

    serve_http(&settings, router_state, admin_state).await
}

async fn run_generate(settings: config::Settings) -> Result<(), AppError> {
    let source = Arc::new(GithubSource::new(&settings.github)?);
    let reports: Arc<dyn ReportsRepo> =
        Arc::new(FsReportRepository::new(settings.storage.reports_dir.clone()));

    let notifier = if settings.generator.send_notifications {
        let subscriptions: Arc<dyn SubscriptionsRepo> = Arc::new(JsonSubscriptionStore::new(
            settings.storage.subscriptions_file.clone(),
        ));
        Some(build_notify_service(&settings, subscriptions)?)
    } else {
        None
    };

    let generator = ReportGenerator::new(
        source,
        reports,
        notifier,
        GeneratorConfig {
            retry: (&settings.generator.retry).into(),
            fallback_to_mock: settings.generator.fallback_to_mock,
            send_notifications: settings.generator.send_notifications,
            site_base_url: settings.site.base_url.clone(),
        },
    );

    let generated = generator.run(OffsetDateTime::now_utc()).await?;
    info!(
        target = "weekly_trends::generator",
        week = %generated.week,
        path = %generated.path.display(),
        notified = generated.notification.as_ref().map(|outcome| outcome.sent),
        "generate command finished"
    );
    Ok(())
}

fn build_notify_service(
    settings: &config::Settings,
    subscriptions: Arc<dyn SubscriptionsRepo>,
) -> Result<Arc<NotifyService>, AppError> {
    let transport = match settings.push.vapid.as_ref() {
        Some(vapid) => {
            Some(Arc::new(WebPushTransport::new(vapid)?) as Arc<dyn PushTransport>)
        }
        None => None,
    };

    let dispatcher = NotificationDispatcher::new(
        subscriptions.clone(),
        transport,
        DispatcherConfig {
            concurrency: settings.push.concurrency.get() as usize,
            timeout: settings.push.timeout,
            default_url: settings.site.base_url.clone(),
        },
    );

    Ok(Arc::new(NotifyService::new(
        Arc::new(dispatcher),
        subscriptions,
        settings.push.prune_stale,
    )))
}

async fn serve_http(
    settings: &config::Settings,
    router_state: RouterState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_public_app(router_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "weekly_trends::startup",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
        .into_future();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
        .into_future();

    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        wait_for_shutdown(shutdown_rx).await;
        tokio::time::sleep(grace).await;
    };

    let result = tokio::select! {
        result = async { try_join!(public_server, admin_server) } => result
            .map(|_| ())
            .map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        _ = drain_deadline => {
            warn!(
                target = "weekly_trends::startup",
                grace_seconds = grace.as_secs(),
                "connections still open after the shutdown grace period"
            );
            Ok(())
        }
    };

    signal_task.abort();
    info!(target = "weekly_trends::startup", "server stopped");
    result
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "weekly_trends::startup", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "weekly_trends::startup", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target = "weekly_trends::startup", "shutdown signal received");
}
