//! Integration tests for settings resolution.
//!
//! These tests drive the public resolver with explicit environments and
//! stub metadata probes, so no process environment or network is needed.

use std::cell::Cell;
use std::time::Duration;

use bullet_train_settings::config::pipeline::{
    ADMIN_WHITELIST_MIDDLEWARE, AXES_BACKEND, AXES_MIDDLEWARE, GOOGLE_ANALYTICS_MIDDLEWARE,
    INFLUXDB_MIDDLEWARE, MODEL_BACKEND, SSO_BACKEND,
};
use bullet_train_settings::config::{DatabaseEngine, DeploymentEnvironment, Integration};
use bullet_train_settings::{
    DisabledProbe, EnvVars, InstanceMetadataProbe, MetadataProbe, Resolution, Resolver,
    SettingsError,
};

// =============================================================================
// Stub probes
// =============================================================================

/// Probe that reports a fixed private address and counts lookups
struct FixedAddressProbe {
    address: &'static str,
    calls: Cell<u32>,
}

impl FixedAddressProbe {
    fn new(address: &'static str) -> Self {
        Self {
            address,
            calls: Cell::new(0),
        }
    }
}

impl MetadataProbe for FixedAddressProbe {
    fn local_ipv4(&self) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        Some(self.address.to_string())
    }
}

// =============================================================================
// Helpers
// =============================================================================

const DATABASE_URL: &str = "postgres://bullettrain:password@db:5432/bullettrain";

fn env_with(pairs: &[(&str, &str)]) -> EnvVars {
    pairs
        .iter()
        .copied()
        .chain([("DATABASE_URL", DATABASE_URL)])
        .collect()
}

fn resolve(pairs: &[(&str, &str)]) -> Resolution {
    Resolver::with_probe(DisabledProbe)
        .resolve(&env_with(pairs))
        .expect("settings should resolve")
}

fn advised(resolution: &Resolution, setting: &str) -> bool {
    resolution.advisories.iter().any(|a| a.setting == setting)
}

// =============================================================================
// Explicit values are parsed into their declared types
// =============================================================================

#[test]
fn test_explicit_values_are_parsed() {
    let resolution = resolve(&[
        ("ENVIRONMENT", "production"),
        ("DEBUG", "true"),
        ("DJANGO_SECRET_KEY", "s3cr3t"),
        ("HOSTED_SEATS_LIMIT", "25"),
        ("GOOGLE_ANALYTICS_KEY", "UA-1234"),
        ("GOOGLE_SERVICE_ACCOUNT", "{\"type\": \"service_account\"}"),
        ("GA_TABLE_ID", "ga:5678"),
        ("DJANGO_ALLOWED_HOSTS", "api.bullet-train.io,admin.bullet-train.io"),
        ("DJANGO_CSRF_TRUSTED_ORIGINS", "app.bullet-train.io"),
        ("CACHE_FLAGS_SECONDS", "30"),
        ("CACHE_PROJECT_SEGMENTS_SECONDS", "120"),
        ("SENDER_EMAIL", "hello@example.com"),
        ("EMAIL_BACKEND", "django_ses.SESBackend"),
        ("AWS_SES_REGION_NAME", "eu-west-2"),
        ("AWS_SES_REGION_ENDPOINT", "email.eu-west-2.amazonaws.com"),
        ("ENABLE_EMAIL_ACTIVATION", "yes"),
        ("USER_CREATE_PERMISSIONS", "rest_framework.permissions.IsAdminUser"),
        ("LOG_LEVEL", "INFO"),
        ("SENTRY_SDK_DSN", "https://key@sentry.example.com/1"),
        ("SENTRY_TRACE_SAMPLE_RATE", "0.2"),
        ("OAUTH_CLIENT_ID", "sso-id"),
        ("OAUTH_CLIENT_SECRET", "sso-secret"),
    ]);
    let settings = &resolution.settings;

    assert_eq!(settings.environment, DeploymentEnvironment::Production);
    assert!(settings.debug);
    assert_eq!(settings.secret_key(), "s3cr3t");
    assert_eq!(settings.hosted_seats_limit, 25);
    assert_eq!(settings.google_analytics.key, "UA-1234");
    assert_eq!(settings.google_analytics.table_id.as_deref(), Some("ga:5678"));
    assert_eq!(
        settings.allowed_hosts,
        vec!["api.bullet-train.io", "admin.bullet-train.io"]
    );
    assert_eq!(settings.csrf_trusted_origins, vec!["app.bullet-train.io"]);
    assert_eq!(settings.caches.flags_seconds, 30);
    assert_eq!(settings.caches.project_segments_seconds, 120);
    assert_eq!(settings.email.default_from_email, "hello@example.com");
    assert_eq!(settings.email.backend, "django_ses.SESBackend");
    assert_eq!(settings.email.aws_ses_region_name.as_deref(), Some("eu-west-2"));
    assert!(settings.accounts.send_activation_email);
    assert_eq!(
        settings.accounts.user_create_permissions,
        vec!["rest_framework.permissions.IsAdminUser"]
    );
    assert_eq!(settings.logging.filter_directive(), "info");
    assert_eq!(settings.sentry.trace_sample_rate, 0.2);
    assert!(settings.admin_sso_oauth.is_configured());
    assert_eq!(settings.database.engine, DatabaseEngine::Postgresql);
    assert_eq!(settings.database.host.as_deref(), Some("db"));
    assert_eq!(settings.database.port, Some(5432));

    assert!(settings.is_enabled(Integration::GoogleAnalytics));
    assert!(settings.is_enabled(Integration::Sentry));
    assert!(!settings.is_enabled(Integration::SendGrid));
    assert!(resolution.advisories.is_empty());
}

// =============================================================================
// Absent values fall back to documented defaults
// =============================================================================

#[test]
fn test_defaults_when_unset() {
    let resolution = resolve(&[]);
    let settings = &resolution.settings;

    assert_eq!(settings.environment, DeploymentEnvironment::Local);
    assert!(!settings.debug);
    assert_eq!(settings.secret_key().len(), 50);
    assert_eq!(settings.hosted_seats_limit, 0);
    assert!(settings.allowed_hosts.is_empty());
    assert!(settings.csrf_trusted_origins.is_empty());
    assert_eq!(settings.internal_ips, vec!["127.0.0.1"]);
    assert_eq!(settings.caches.flags_seconds, 0);
    assert_eq!(settings.caches.project_segments_seconds, 0);
    assert_eq!(settings.caches.backends.len(), 4);
    assert_eq!(settings.email.default_from_email, "noreply@bullet-train.io");
    assert_eq!(settings.email.backend, "sgbackend.SendGridBackend");
    assert_eq!(settings.logging.level, "WARNING");
    assert_eq!(
        settings.accounts.user_create_permissions,
        vec!["rest_framework.permissions.AllowAny"]
    );
    assert!(!settings.accounts.send_activation_email);
    assert_eq!(settings.sentry.trace_sample_rate, 1.0);
    assert!(settings.sentry.dsn.is_none());
    assert!(settings.axes.is_none());
    assert!(!settings.chargebee.enabled);
    assert!(settings.integrations.is_empty());
    assert!(!settings.installed_apps.iter().any(|app| app == "analytics"));
    assert_eq!(settings.middleware.len(), 9);
    assert_eq!(settings.authentication_backends, vec![SSO_BACKEND, MODEL_BACKEND]);
    assert_eq!(settings.rest_framework.page_size, 10);
    assert_eq!(settings.rest_framework.throttle_rates["login"], "1/s");
    assert!(settings.cors.origin_allow_all);
    assert!(settings.cors.allow_headers.iter().any(|h| h == "X-Environment-Key"));
}

#[test]
fn test_fixed_framework_groups() {
    let settings = resolve(&[]).settings;

    assert_eq!(settings.wsgi_application, "app.wsgi.application");
    assert!(settings.use_i18n && settings.use_l10n && settings.use_tz);
    assert_eq!(settings.static_root, "../../static/");

    assert_eq!(settings.templates.len(), 1);
    let templates = &settings.templates[0];
    assert_eq!(templates.backend, "django.template.backends.django.DjangoTemplates");
    assert!(templates.dirs.is_empty());
    assert!(templates.app_dirs);
    assert_eq!(templates.context_processors.len(), 4);

    assert!(!settings.account_policy.username_required);
    assert!(settings.account_policy.email_required);
    assert_eq!(settings.account_policy.authentication_method, "email");
    assert_eq!(settings.account_policy.email_verification, "none");

    assert_eq!(
        settings.accounts.serializers["token"],
        "custom_auth.serializers.CustomTokenSerializer"
    );
    assert_eq!(
        settings.accounts.serializers["current_user"],
        "users.serializers.CustomCurrentUserSerializer"
    );
    assert_eq!(settings.accounts.emails["activation"], "users.emails.ActivationEmail");
    assert_eq!(settings.accounts.emails["confirmation"], "users.emails.ConfirmationEmail");
    assert_eq!(
        settings.accounts.user_permissions,
        vec!["custom_auth.permissions.CurrentUser"]
    );
    assert_eq!(settings.accounts.user_list_permissions, settings.accounts.user_permissions);

    assert!(!settings.logging.disable_existing_loggers);
    assert_eq!(settings.logging.console_format, "%(name)-12s %(levelname)-8s %(message)s");
    assert_eq!(settings.logging.console_level, "DEBUG");
    assert_eq!(settings.logging.loggers["django"], "INFO");
    assert_eq!(settings.logging.loggers[""], "DEBUG");

    assert_eq!(settings.caches.flags_location, "environment-flags");
    assert_eq!(settings.caches.environment_location, "environment-objects");
    assert_eq!(settings.caches.project_segments_location, "project-segments");
    assert!(settings.caches.backends.contains_key(&settings.caches.flags_location));

    assert!(settings.swagger.show_request_headers);
    assert_eq!(
        serde_json::to_value(&settings.swagger.security_definitions["api_key"]).unwrap(),
        serde_json::json!({"type": "apiKey", "in": "header", "name": "Authorization"})
    );
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_resolution_is_deterministic() {
    let env = env_with(&[
        ("DJANGO_SECRET_KEY", "fixed"),
        ("ENABLE_AXES", "true"),
        ("INFLUXDB_TOKEN", "token"),
        ("ALLOWED_ADMIN_IP_ADDRESSES", "10.0.0.1"),
    ]);
    let resolver = Resolver::with_probe(DisabledProbe);

    let first = resolver.resolve(&env).unwrap();
    let second = resolver.resolve(&env).unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// Advisories
// =============================================================================

#[test]
fn test_missing_google_service_account_is_advisory() {
    let resolution = resolve(&[]);

    assert!(advised(&resolution, "GOOGLE_SERVICE_ACCOUNT"));
    assert!(advised(&resolution, "GA_TABLE_ID"));
    assert!(resolution.settings.google_analytics.service_account.is_none());
}

#[test]
fn test_unknown_environment_is_advisory_and_kept() {
    let resolution = resolve(&[("ENVIRONMENT", "bogus")]);

    assert!(advised(&resolution, "ENVIRONMENT"));
    assert_eq!(
        resolution.settings.environment,
        DeploymentEnvironment::Other("bogus".to_string())
    );
    assert_eq!(resolution.settings.environment.as_str(), "bogus");
}

#[test]
fn test_sendgrid_without_key_is_advisory() {
    let without_key = resolve(&[]);
    assert!(advised(&without_key, "SENDGRID_API_KEY"));

    let with_key = resolve(&[("SENDGRID_API_KEY", "sg-key")]);
    assert!(!advised(&with_key, "SENDGRID_API_KEY"));
    assert!(with_key.settings.is_enabled(Integration::SendGrid));

    let other_backend = resolve(&[("EMAIL_BACKEND", "django.core.mail.backends.smtp.EmailBackend")]);
    assert!(!advised(&other_backend, "SENDGRID_API_KEY"));
}

// =============================================================================
// Ordered composition
// =============================================================================

#[test]
fn test_axes_is_last_middleware_and_first_backend() {
    let resolution = resolve(&[
        ("ENABLE_AXES", "true"),
        ("GOOGLE_ANALYTICS_KEY", "UA-1234"),
        ("INFLUXDB_TOKEN", "token"),
        ("ALLOWED_ADMIN_IP_ADDRESSES", "10.0.0.1,10.0.0.2"),
    ]);
    let settings = &resolution.settings;

    assert_eq!(settings.middleware.last().map(String::as_str), Some(AXES_MIDDLEWARE));
    assert_eq!(
        settings.authentication_backends.first().map(String::as_str),
        Some(AXES_BACKEND)
    );
    assert_eq!(
        &settings.middleware[9..],
        &[
            GOOGLE_ANALYTICS_MIDDLEWARE,
            INFLUXDB_MIDDLEWARE,
            ADMIN_WHITELIST_MIDDLEWARE,
            AXES_MIDDLEWARE,
        ]
    );

    let axes = settings.axes.as_ref().expect("axes settings");
    assert_eq!(axes.cooloff_minutes, 15);
    assert_eq!(axes.blacklisted_urls, vec!["/admin/login/?next=/admin", "/admin/"]);
}

#[test]
fn test_axes_cooloff_is_configurable() {
    let resolution = resolve(&[("ENABLE_AXES", "1"), ("AXES_COOLOFF_TIME", "60")]);
    let axes = resolution.settings.axes.expect("axes settings");
    assert_eq!(axes.cooloff().as_secs(), 3600);
}

#[test]
fn test_axes_cooloff_out_of_range_is_fatal() {
    for minutes in ["9223372036854775807", "-5"] {
        let err = Resolver::with_probe(DisabledProbe)
            .resolve(&env_with(&[("ENABLE_AXES", "true"), ("AXES_COOLOFF_TIME", minutes)]))
            .unwrap_err();

        assert_eq!(
            err,
            SettingsError::Parse {
                name: "AXES_COOLOFF_TIME",
                value: minutes.to_string(),
                expected: "non-negative number of minutes",
            }
        );
    }
}

#[test]
fn test_axes_cooloff_ignored_when_disabled() {
    // Only read when Axes is on, so a bad value is harmless otherwise
    let resolution = resolve(&[("AXES_COOLOFF_TIME", "soon")]);
    assert!(resolution.settings.axes.is_none());
}

#[test]
fn test_admin_ip_restriction_adds_whitelist_middleware() {
    let resolution = resolve(&[("ALLOWED_ADMIN_IP_ADDRESSES", "10.0.0.1")]);

    assert!(advised(&resolution, "ALLOWED_ADMIN_IP_ADDRESSES"));
    assert_eq!(
        resolution.settings.middleware.last().map(String::as_str),
        Some(ADMIN_WHITELIST_MIDDLEWARE)
    );
}

#[test]
fn test_analytics_app_installed_with_influxdb_only() {
    let resolution = resolve(&[
        ("INFLUXDB_TOKEN", "token"),
        ("INFLUXDB_BUCKET", "flags"),
        ("INFLUXDB_URL", "https://influx.example.com"),
        ("INFLUXDB_ORG", "bullet-train"),
    ]);
    let settings = &resolution.settings;

    assert_eq!(settings.installed_apps.last().map(String::as_str), Some("analytics"));
    assert!(settings.middleware.iter().any(|m| m == INFLUXDB_MIDDLEWARE));
    assert!(!settings.middleware.iter().any(|m| m == GOOGLE_ANALYTICS_MIDDLEWARE));
    assert!(!advised(&resolution, "INFLUXDB_TOKEN"));
}

// =============================================================================
// Instance metadata
// =============================================================================

#[test]
fn test_probed_address_is_allowed_host() {
    let probe = FixedAddressProbe::new("172.31.4.20");
    let resolver = Resolver::with_probe(probe);

    let resolution = resolver
        .resolve(&env_with(&[("DJANGO_ALLOWED_HOSTS", "api.bullet-train.io")]))
        .unwrap();

    assert_eq!(
        resolution.settings.allowed_hosts,
        vec!["api.bullet-train.io", "172.31.4.20"]
    );
}

#[test]
fn test_probe_runs_once_per_resolution() {
    let probe = FixedAddressProbe::new("172.31.4.20");
    let resolver = Resolver::with_probe(&probe);

    resolver.resolve(&env_with(&[])).unwrap();
    assert_eq!(probe.calls.get(), 1);
}

#[test]
fn test_failed_probe_leaves_hosts_untouched() {
    let resolution = resolve(&[("DJANGO_ALLOWED_HOSTS", "api.bullet-train.io")]);
    assert_eq!(resolution.settings.allowed_hosts, vec!["api.bullet-train.io"]);
    assert!(resolution.advisories.iter().all(|a| a.setting != "DJANGO_ALLOWED_HOSTS"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_network_lookup_inside_async_runtime_resolves() {
    let resolver = Resolver::with_probe(InstanceMetadataProbe::new(
        "http://127.0.0.1:9/latest/meta-data/local-ipv4",
        Duration::from_millis(200),
    ));

    let resolution = resolver
        .resolve(&env_with(&[("DJANGO_ALLOWED_HOSTS", "api.bullet-train.io")]))
        .expect("settings should resolve inside a runtime");

    assert_eq!(resolution.settings.allowed_hosts, vec!["api.bullet-train.io"]);
}

// =============================================================================
// Fatal errors
// =============================================================================

#[test]
fn test_missing_database_url_is_fatal() {
    let env: EnvVars = [("ENVIRONMENT", "dev")].into_iter().collect();
    let err = Resolver::with_probe(DisabledProbe).resolve(&env).unwrap_err();

    assert_eq!(err, SettingsError::Missing { name: "DATABASE_URL" });
}

#[test]
fn test_invalid_database_url_is_fatal() {
    let env: EnvVars = [("DATABASE_URL", "mongodb://localhost/flags")]
        .into_iter()
        .collect();
    let err = Resolver::with_probe(DisabledProbe).resolve(&env).unwrap_err();

    assert!(matches!(err, SettingsError::InvalidDatabaseUrl(_)));
}

#[test]
fn test_unparsable_values_are_fatal() {
    let cases = [
        ("HOSTED_SEATS_LIMIT", "unlimited", "integer"),
        ("DEBUG", "sometimes", "boolean"),
        ("ENABLE_AXES", "perhaps", "boolean"),
        ("CACHE_FLAGS_SECONDS", "1m", "integer"),
        ("SENTRY_TRACE_SAMPLE_RATE", "all", "float"),
    ];

    for (name, value, expected_type) in cases {
        let err = Resolver::with_probe(DisabledProbe)
            .resolve(&env_with(&[(name, value)]))
            .unwrap_err();

        assert_eq!(
            err,
            SettingsError::Parse {
                name,
                value: value.to_string(),
                expected: expected_type,
            },
            "{} should fail to parse",
            name
        );
    }
}
