use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the weekly-trends binary.
#[derive(Debug, Parser)]
#[command(
    name = "weekly-trends",
    version,
    about = "React weekly trends blog and push notification service"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "WEEKLY_TRENDS_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub shared: SharedOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the blog, the subscription API and the admin notify endpoint.
    Serve(Box<ServeArgs>),
    /// Generate this week's report and optionally notify subscribers.
    Generate(GenerateArgs),
}

/// Overrides accepted by every command.
#[derive(Debug, Args, Default, Clone)]
pub struct SharedOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the public site URL used in links and notifications.
    #[arg(long = "site-base-url", value_name = "URL", global = true)]
    pub site_base_url: Option<String>,

    /// Override the directory holding report markdown files.
    #[arg(long = "reports-dir", value_name = "PATH", global = true)]
    pub reports_dir: Option<PathBuf>,

    /// Override the JSON file holding push subscriptions.
    #[arg(long = "subscriptions-file", value_name = "PATH", global = true)]
    pub subscriptions_file: Option<PathBuf>,

    /// VAPID public key (base64url).
    #[arg(
        long = "vapid-public-key",
        env = "VAPID_PUBLIC_KEY",
        value_name = "KEY",
        hide_env_values = true,
        global = true
    )]
    pub vapid_public_key: Option<String>,

    /// VAPID private key (base64url).
    #[arg(
        long = "vapid-private-key",
        env = "VAPID_PRIVATE_KEY",
        value_name = "KEY",
        hide_env_values = true,
        global = true
    )]
    pub vapid_private_key: Option<String>,

    /// Contact URI sent in the VAPID `sub` claim.
    #[arg(long = "vapid-subject", value_name = "URI", global = true)]
    pub vapid_subject: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the number of concurrent push deliveries.
    #[arg(long = "push-concurrency", value_name = "COUNT")]
    pub push_concurrency: Option<u32>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GenerateArgs {
    /// GitHub token for the search API; mock repositories are used without one.
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub github_token: Option<String>,

    /// Notify subscribers once the report is written.
    #[arg(
        long = "send-notifications",
        env = "SEND_NOTIFICATIONS",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub send_notifications: Option<bool>,

    /// Abort instead of substituting mock data when upstream fetches fail.
    #[arg(long = "no-mock-fallback", action = clap::ArgAction::SetTrue)]
    pub no_mock_fallback: bool,
}
