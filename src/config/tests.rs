use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let shared = SharedOverrides {
        log_level: Some("debug".to_string()),
        ..Default::default()
    };
    let overrides = ServeOverrides {
        public_port: Some(4321),
        ..Default::default()
    };

    raw.apply_shared_overrides(&shared);
    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_describe_a_local_deployment() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), DEFAULT_PUBLIC_PORT);
    assert!(settings.server.admin_addr.ip().is_loopback());
    assert_eq!(settings.site.base_url, DEFAULT_SITE_BASE_URL);
    assert_eq!(settings.storage.reports_dir, PathBuf::from("reports"));
    assert_eq!(
        settings.storage.subscriptions_file,
        PathBuf::from("data/subscriptions.json")
    );
    assert!(settings.push.vapid.is_none());
    assert_eq!(settings.push.concurrency.get(), 4);
    assert_eq!(settings.push.timeout, Duration::from_secs(10));
    assert!(settings.push.prune_stale);
    assert!(settings.github.token.is_none());
    assert!(!settings.generator.send_notifications);
    assert!(settings.generator.fallback_to_mock);
    assert_eq!(settings.generator.retry.max_retries, 3);
    assert_eq!(settings.generator.retry.initial_delay_ms, 1_000);
    assert_eq!(settings.generator.retry.max_delay_ms, 30_000);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_shared_overrides(&SharedOverrides {
        log_json: Some(true),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn vapid_requires_both_keys() {
    let mut raw = RawSettings::default();
    raw.push.vapid_public_key = Some("public".to_string());
    let settings = Settings::from_raw(raw.clone()).expect("valid settings");
    assert!(settings.push.vapid.is_none());

    raw.push.vapid_private_key = Some("private".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    let vapid = settings.push.vapid.expect("vapid configured");
    assert_eq!(vapid.public_key, "public");
    assert_eq!(vapid.subject, DEFAULT_VAPID_SUBJECT);
}

#[test]
fn blank_vapid_keys_count_as_missing() {
    let mut raw = RawSettings::default();
    raw.push.vapid_public_key = Some("public".to_string());
    raw.push.vapid_private_key = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.push.vapid.is_none());
}

#[test]
fn vapid_debug_output_hides_private_key() {
    let vapid = VapidSettings {
        public_key: "public".to_string(),
        private_key: "very-secret".to_string(),
        subject: DEFAULT_VAPID_SUBJECT.to_string(),
    };

    let rendered = format!("{vapid:?}");
    assert!(!rendered.contains("very-secret"));
    assert!(rendered.contains("public"));
}

#[test]
fn site_base_url_drops_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("https://trends.example.com/".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.base_url, "https://trends.example.com");
}

#[test]
fn site_base_url_must_be_http() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("ftp://trends.example.com".to_string());

    let err = Settings::from_raw(raw).expect_err("ftp is rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "site.base_url",
            ..
        }
    ));
}

#[test]
fn zero_push_concurrency_is_rejected() {
    let mut raw = RawSettings::default();
    raw.push.concurrency = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero concurrency");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "push.concurrency",
            ..
        }
    ));
}

#[test]
fn admin_listener_cannot_share_public_address() {
    let mut raw = RawSettings::default();
    raw.server.host = Some("127.0.0.1".to_string());
    raw.server.public_port = Some(3000);
    raw.server.admin_port = Some(3000);

    let err = Settings::from_raw(raw).expect_err("shared address");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.admin_port",
            ..
        }
    ));
}

#[test]
fn retry_delays_must_be_ordered() {
    let mut raw = RawSettings::default();
    raw.generator.retry.initial_delay_ms = Some(5_000);
    raw.generator.retry.max_delay_ms = Some(1_000);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["weekly-trends"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "weekly-trends",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--server-public-port",
        "8080",
        "--reports-dir",
        "/srv/reports",
    ]);

    assert_eq!(
        args.shared.reports_dir.as_deref(),
        Some(std::path::Path::new("/srv/reports"))
    );
    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.public_port, Some(8080));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_generate_arguments() {
    let args = CliArgs::parse_from([
        "weekly-trends",
        "generate",
        "--send-notifications",
        "yes",
        "--no-mock-fallback",
    ]);

    let Some(Command::Generate(generate)) = args.command else {
        panic!("generate command expected");
    };
    assert_eq!(generate.send_notifications, Some(true));
    assert!(generate.no_mock_fallback);

    let mut raw = RawSettings::default();
    raw.apply_generate_overrides(&generate);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.generator.send_notifications);
    assert!(!settings.generator.fallback_to_mock);
}
