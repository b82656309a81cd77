//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    net::SocketAddr,
    num::NonZeroU32,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, GenerateArgs, ServeArgs, ServeOverrides, SharedOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "weekly-trends";
const ENV_PREFIX: &str = "WEEKLY_TRENDS";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ADMIN_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_ADMIN_PORT: u16 = 3001;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_SITE_TITLE: &str = "React Weekly Trends";
const DEFAULT_SITE_DESCRIPTION: &str =
    "Weekly insights into the React ecosystem: trending repositories and notable libraries.";
const DEFAULT_SITE_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_SUBSCRIPTIONS_FILE: &str = "data/subscriptions.json";
const DEFAULT_VAPID_SUBJECT: &str = "mailto:admin@example.com";
const DEFAULT_PUSH_CONCURRENCY: u64 = 4;
const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_AWESOME_README_URL: &str =
    "https://raw.githubusercontent.com/enaqx/awesome-react/master/README.md";
const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1_000;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;
const DEFAULT_RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub storage: StorageSettings,
    pub push: PushSettings,
    pub github: GithubSettings,
    pub generator: GeneratorSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    /// Absolute site root without a trailing slash.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub reports_dir: PathBuf,
    pub subscriptions_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PushSettings {
    /// `None` unless both VAPID keys are configured.
    pub vapid: Option<VapidSettings>,
    pub concurrency: NonZeroU32,
    pub timeout: Duration,
    pub prune_stale: bool,
}

#[derive(Clone)]
pub struct VapidSettings {
    pub public_key: String,
    pub private_key: String,
    pub subject: String,
}

impl std::fmt::Debug for VapidSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSettings")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

#[derive(Clone)]
pub struct GithubSettings {
    pub token: Option<String>,
    pub api_base: String,
    pub awesome_readme_url: String,
    pub timeout_seconds: NonZeroU32,
}

impl std::fmt::Debug for GithubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("awesome_readme_url", &self.awesome_readme_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub send_notifications: bool,
    pub fallback_to_mock: bool,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_shared_overrides(&cli.shared);
    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Generate(args)) => raw.apply_generate_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    storage: RawStorageSettings,
    push: RawPushSettings,
    github: RawGithubSettings,
    generator: RawGeneratorSettings,
}

impl RawSettings {
    fn apply_shared_overrides(&mut self, overrides: &SharedOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
        if let Some(dir) = overrides.reports_dir.as_ref() {
            self.storage.reports_dir = Some(dir.clone());
        }
        if let Some(file) = overrides.subscriptions_file.as_ref() {
            self.storage.subscriptions_file = Some(file.clone());
        }
        if let Some(key) = overrides.vapid_public_key.as_ref() {
            self.push.vapid_public_key = Some(key.clone());
        }
        if let Some(key) = overrides.vapid_private_key.as_ref() {
            self.push.vapid_private_key = Some(key.clone());
        }
        if let Some(subject) = overrides.vapid_subject.as_ref() {
            self.push.vapid_subject = Some(subject.clone());
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(host) = overrides.server_admin_host.as_ref() {
            self.server.admin_host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(port) = overrides.admin_port {
            self.server.admin_port = Some(port);
        }
        if let Some(concurrency) = overrides.push_concurrency {
            self.push.concurrency = Some(concurrency.into());
        }
    }

    fn apply_generate_overrides(&mut self, args: &GenerateArgs) {
        if let Some(token) = args.github_token.as_ref() {
            self.github.token = Some(token.clone());
        }
        if let Some(send) = args.send_notifications {
            self.generator.send_notifications = Some(send);
        }
        if args.no_mock_fallback {
            self.generator.fallback_to_mock = Some(false);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            site,
            storage,
            push,
            github,
            generator,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let site = build_site_settings(site)?;
        let storage = build_storage_settings(storage);
        let push = build_push_settings(push)?;
        let github = build_github_settings(github)?;
        let generator = build_generator_settings(generator)?;

        Ok(Self {
            server,
            logging,
            site,
            storage,
            push,
            github,
            generator,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let admin_host = server
        .admin_host
        .unwrap_or_else(|| DEFAULT_ADMIN_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let admin_port = server.admin_port.unwrap_or(DEFAULT_ADMIN_PORT);
    if admin_port == 0 {
        return Err(LoadError::invalid(
            "server.admin_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;
    let admin_addr = parse_socket_addr(&admin_host, admin_port)
        .map_err(|reason| LoadError::invalid("server.admin_addr", reason))?;

    if public_addr == admin_addr {
        return Err(LoadError::invalid(
            "server.admin_port",
            "admin listener must not share the public address",
        ));
    }

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        public_addr,
        admin_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let base_url = non_empty(site.base_url).unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string());
    let parsed = url::Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("site.base_url", format!("failed to parse: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.base_url",
            "scheme must be http or https",
        ));
    }

    Ok(SiteSettings {
        title: non_empty(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        description: non_empty(site.description)
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}

fn build_storage_settings(storage: RawStorageSettings) -> StorageSettings {
    StorageSettings {
        reports_dir: storage
            .reports_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
        subscriptions_file: storage
            .subscriptions_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSCRIPTIONS_FILE)),
    }
}

fn build_push_settings(push: RawPushSettings) -> Result<PushSettings, LoadError> {
    let vapid = match (
        non_empty(push.vapid_public_key),
        non_empty(push.vapid_private_key),
    ) {
        (Some(public_key), Some(private_key)) => Some(VapidSettings {
            public_key,
            private_key,
            subject: non_empty(push.vapid_subject)
                .unwrap_or_else(|| DEFAULT_VAPID_SUBJECT.to_string()),
        }),
        _ => None,
    };

    let concurrency = non_zero_u32(
        push.concurrency.unwrap_or(DEFAULT_PUSH_CONCURRENCY),
        "push.concurrency",
    )?;

    let timeout_secs = push.timeout_seconds.unwrap_or(DEFAULT_PUSH_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "push.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(PushSettings {
        vapid,
        concurrency,
        timeout: Duration::from_secs(timeout_secs),
        prune_stale: push.prune_stale.unwrap_or(true),
    })
}

fn build_github_settings(github: RawGithubSettings) -> Result<GithubSettings, LoadError> {
    let timeout_seconds = non_zero_u32(
        github.timeout_seconds.unwrap_or(DEFAULT_GITHUB_TIMEOUT_SECS),
        "github.timeout_seconds",
    )?;

    Ok(GithubSettings {
        token: non_empty(github.token),
        api_base: non_empty(github.api_base)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
        awesome_readme_url: non_empty(github.awesome_readme_url)
            .unwrap_or_else(|| DEFAULT_AWESOME_README_URL.to_string()),
        timeout_seconds,
    })
}

fn build_generator_settings(
    generator: RawGeneratorSettings,
) -> Result<GeneratorSettings, LoadError> {
    let retry = generator.retry;
    let initial_delay_ms = retry
        .initial_delay_ms
        .unwrap_or(DEFAULT_RETRY_INITIAL_DELAY_MS);
    let max_delay_ms = retry.max_delay_ms.unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS);
    if max_delay_ms < initial_delay_ms {
        return Err(LoadError::invalid(
            "generator.retry.max_delay_ms",
            "must not be lower than initial_delay_ms",
        ));
    }

    let backoff_multiplier = retry
        .backoff_multiplier
        .unwrap_or(DEFAULT_RETRY_BACKOFF_MULTIPLIER);
    if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
        return Err(LoadError::invalid(
            "generator.retry.backoff_multiplier",
            "must be a finite number of at least 1.0",
        ));
    }

    Ok(GeneratorSettings {
        send_notifications: generator.send_notifications.unwrap_or(false),
        fallback_to_mock: generator.fallback_to_mock.unwrap_or(true),
        retry: RetrySettings {
            max_retries: retry.max_retries.unwrap_or(DEFAULT_RETRY_MAX_RETRIES),
            initial_delay_ms,
            max_delay_ms,
            backoff_multiplier,
        },
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    admin_host: Option<String>,
    public_port: Option<u16>,
    admin_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    reports_dir: Option<PathBuf>,
    subscriptions_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPushSettings {
    vapid_public_key: Option<String>,
    vapid_private_key: Option<String>,
    vapid_subject: Option<String>,
    concurrency: Option<u64>,
    timeout_seconds: Option<u64>,
    prune_stale: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGithubSettings {
    token: Option<String>,
    api_base: Option<String>,
    awesome_readme_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGeneratorSettings {
    send_notifications: Option<bool>,
    fallback_to_mock: Option<bool>,
    retry: RawRetrySettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRetrySettings {
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
