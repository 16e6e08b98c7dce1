//! Resolved application settings.
//!
//! Everything here is built once by [`Resolver`](super::Resolver) and
//! never mutated afterwards. Share it by reference or behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::constants::KNOWN_ENVIRONMENTS;
use super::database::DatabaseConfig;
use super::secret::Secret;

/// Deployment environment the process runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentEnvironment {
    Local,
    Dev,
    Staging,
    Production,
    /// Unrecognised name, kept verbatim
    Other(String),
}

impl DeploymentEnvironment {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "local" => Self::Local,
            "dev" => Self::Dev,
            "staging" => Self::Staging,
            "production" => Self::Production,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => KNOWN_ENVIRONMENTS[0],
            Self::Dev => KNOWN_ENVIRONMENTS[1],
            Self::Staging => KNOWN_ENVIRONMENTS[2],
            Self::Production => KNOWN_ENVIRONMENTS[3],
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeploymentEnvironment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Optional third-party services, enabled only when their credentials are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    GoogleAnalytics,
    InfluxDb,
    Sentry,
    Chargebee,
    GithubOAuth,
    SendGrid,
}

/// Google Analytics credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleAnalyticsConfig {
    pub key: String,
    pub service_account: Option<Secret>,
    pub table_id: Option<String>,
}

/// InfluxDB time-series metrics credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluxDbConfig {
    pub token: Secret,
    pub bucket: String,
    pub url: String,
    pub org: String,
}

impl InfluxDbConfig {
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty()
    }
}

/// A single cache backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheConfig {
    pub backend: &'static str,
    pub location: String,
}

impl CacheConfig {
    /// Process-local memory cache
    pub fn local_memory(location: &str) -> Self {
        Self {
            backend: "django.core.cache.backends.locmem.LocMemCache",
            location: location.to_string(),
        }
    }
}

/// Named cache backends plus the TTLs of the cached object groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachesConfig {
    pub backends: BTreeMap<String, CacheConfig>,
    pub flags_seconds: i64,
    pub project_segments_seconds: i64,
    /// Backend names the application looks its caches up by
    pub flags_location: String,
    pub environment_location: String,
    pub project_segments_location: String,
}

/// Outgoing email settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailConfig {
    pub backend: String,
    pub sendgrid_api_key: Option<Secret>,
    pub default_from_email: String,
    pub invite_subject_with_name: &'static str,
    pub invite_subject_without_name: &'static str,
    pub invite_from_email: String,
    pub aws_ses_region_name: Option<String>,
    pub aws_ses_region_endpoint: Option<String>,
}

/// OAuth client credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: Secret,
}

impl OAuthClient {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Login rate limiting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesConfig {
    pub cooloff_minutes: u64,
    pub blacklisted_urls: Vec<String>,
}

impl AxesConfig {
    /// Lockout duration, saturating at `u64::MAX` seconds.
    pub fn cooloff(&self) -> Duration {
        Duration::from_secs(self.cooloff_minutes.saturating_mul(60))
    }
}

/// Billing integration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargebeeConfig {
    pub enabled: bool,
    pub api_key: Option<Secret>,
    pub site: Option<String>,
}

/// Error tracking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentryConfig {
    pub dsn: Option<Secret>,
    pub trace_sample_rate: f64,
}

/// REST API defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestFrameworkConfig {
    pub default_permission_classes: Vec<String>,
    pub default_authentication_classes: Vec<String>,
    pub page_size: u32,
    pub unicode_json: bool,
    pub default_pagination_class: String,
    pub throttle_rates: BTreeMap<String, String>,
}

/// Cross-origin request settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorsConfig {
    pub origin_allow_all: bool,
    pub allow_headers: Vec<String>,
}

/// A second-factor method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MfaMethod {
    pub verbose_name: String,
    pub validity_period_seconds: u32,
    pub uses_third_party_client: bool,
    pub handler: String,
}

/// Two-factor authentication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MfaConfig {
    pub from_email: String,
    pub backup_codes_quantity: u32,
    pub backup_codes_length: u32,
    pub backup_codes_characters: String,
    pub default_validity_period_seconds: u32,
    pub confirm_backup_codes_regeneration_with_code: bool,
    pub application_issuer_name: String,
    pub methods: BTreeMap<String, MfaMethod>,
}

/// User registration and account management.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsConfig {
    pub password_reset_confirm_url: String,
    pub send_activation_email: bool,
    pub activation_url: String,
    pub send_confirmation_email: bool,
    pub set_password_retype: bool,
    pub password_reset_confirm_retype: bool,
    pub hide_users: bool,
    pub serializers: BTreeMap<String, String>,
    pub emails: BTreeMap<String, String>,
    pub user_permissions: Vec<String>,
    pub user_list_permissions: Vec<String>,
    pub user_create_permissions: Vec<String>,
}

/// Signup requirements for new accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountPolicy {
    pub username_required: bool,
    pub email_required: bool,
    pub authentication_method: String,
    pub email_verification: String,
}

/// Template engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateConfig {
    pub backend: String,
    pub dirs: Vec<String>,
    pub app_dirs: bool,
    pub context_processors: Vec<String>,
}

/// How API docs authenticate requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
}

/// Interactive API documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwaggerConfig {
    pub show_request_headers: bool,
    pub security_definitions: BTreeMap<String, SecurityDefinition>,
}

/// Logging for the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// Level name as configured, e.g. `WARNING`
    pub level: String,
    pub disable_existing_loggers: bool,
    /// Line format of the console handler
    pub console_format: String,
    pub console_level: String,
    /// Level per logger name, `""` being the root logger
    pub loggers: BTreeMap<String, String>,
}

impl LoggingConfig {
    /// Map a level name to a `tracing` filter directive.
    pub fn directive_for(level: &str) -> Option<&'static str> {
        match level.to_ascii_uppercase().as_str() {
            "DEBUG" => Some("debug"),
            "INFO" => Some("info"),
            "WARN" | "WARNING" => Some("warn"),
            "ERROR" | "CRITICAL" => Some("error"),
            _ => None,
        }
    }

    /// Filter directive for the configured level, `warn` if unrecognised.
    pub fn filter_directive(&self) -> &'static str {
        Self::directive_for(&self.level).unwrap_or("warn")
    }
}

/// Fixed identity of the initial site admin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminBootstrap {
    pub allow_initiation_via_url: bool,
    pub email: String,
    pub initial_password: Secret,
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub environment: DeploymentEnvironment,
    pub debug: bool,
    pub(crate) secret_key: Secret,
    pub hosted_seats_limit: i64,

    pub allowed_hosts: Vec<String>,
    pub csrf_trusted_origins: Vec<String>,
    pub internal_ips: Vec<String>,
    pub allowed_admin_ip_addresses: Vec<String>,

    pub installed_apps: Vec<String>,
    pub integrations: Vec<Integration>,
    pub middleware: Vec<String>,
    pub authentication_backends: Vec<String>,

    pub database: DatabaseConfig,
    pub caches: CachesConfig,
    pub email: EmailConfig,
    pub google_analytics: GoogleAnalyticsConfig,
    pub influxdb: InfluxDbConfig,
    pub admin_sso_oauth: OAuthClient,
    pub github_oauth: OAuthClient,
    pub axes: Option<AxesConfig>,
    pub chargebee: ChargebeeConfig,
    pub sentry: SentryConfig,
    pub rest_framework: RestFrameworkConfig,
    pub cors: CorsConfig,
    pub mfa: MfaConfig,
    pub accounts: AccountsConfig,
    pub account_policy: AccountPolicy,
    pub logging: LoggingConfig,
    pub admin_bootstrap: AdminBootstrap,
    pub password_validators: Vec<String>,

    pub templates: Vec<TemplateConfig>,
    pub swagger: SwaggerConfig,

    pub site_id: u32,
    pub root_urlconf: String,
    pub wsgi_application: String,
    pub auth_user_model: String,
    pub language_code: String,
    pub time_zone: String,
    pub use_i18n: bool,
    pub use_l10n: bool,
    pub use_tz: bool,
    pub static_url: String,
    pub static_root: String,
    pub login_url: String,
    pub logout_url: String,
    pub secure_proxy_ssl_header: (String, String),
    pub fe_e2e_test_user_email: String,
}

impl Settings {
    /// Key used for signing sessions and tokens.
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose()
    }

    pub fn is_enabled(&self, integration: Integration) -> bool {
        self.integrations.contains(&integration)
    }
}
