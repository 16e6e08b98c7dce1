//! Ordered assembly of the middleware stack and authentication backends.
//!
//! Some entries only work at a fixed position: the Axes middleware must
//! run last and the Axes backend must be consulted first. The builder
//! keeps pinned entries apart from the conditional ones, so the final
//! order does not depend on the order the resolver adds things in.

pub const SECURITY_MIDDLEWARE: &str = "django.middleware.security.SecurityMiddleware";
pub const GOOGLE_ANALYTICS_MIDDLEWARE: &str = "analytics.middleware.GoogleAnalyticsMiddleware";
pub const INFLUXDB_MIDDLEWARE: &str = "analytics.middleware.InfluxDBMiddleware";
pub const ADMIN_WHITELIST_MIDDLEWARE: &str = "app.middleware.AdminWhitelistMiddleware";
pub const AXES_MIDDLEWARE: &str = "app.middleware.AxesMiddleware";

pub const BASE_MIDDLEWARE: &[&str] = &[
    SECURITY_MIDDLEWARE,
    "django.contrib.sessions.middleware.SessionMiddleware",
    "corsheaders.middleware.CorsMiddleware",
    "django.middleware.common.CommonMiddleware",
    "django.middleware.csrf.CsrfViewMiddleware",
    "django.contrib.auth.middleware.AuthenticationMiddleware",
    "django.contrib.messages.middleware.MessageMiddleware",
    "django.middleware.clickjacking.XFrameOptionsMiddleware",
    "simple_history.middleware.HistoryRequestMiddleware",
];

pub const AXES_BACKEND: &str = "axes.backends.AxesBackend";
pub const SSO_BACKEND: &str = "admin_sso.auth.DjangoSSOAuthBackend";
pub const MODEL_BACKEND: &str = "django.contrib.auth.backends.ModelBackend";

pub const BASE_AUTHENTICATION_BACKENDS: &[&str] = &[SSO_BACKEND, MODEL_BACKEND];

/// Builder for an ordered list with optional pinned first and last entries.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    first: Option<&'static str>,
    entries: Vec<&'static str>,
    last: Option<&'static str>,
}

impl PipelineBuilder {
    /// Start from a fixed base list.
    pub fn from_base(base: &[&'static str]) -> Self {
        Self {
            entries: base.to_vec(),
            ..Self::default()
        }
    }

    /// Middleware stack starting from the framework defaults.
    pub fn middleware() -> Self {
        Self::from_base(BASE_MIDDLEWARE)
    }

    /// Authentication backends starting from SSO then model auth.
    pub fn authentication_backends() -> Self {
        Self::from_base(BASE_AUTHENTICATION_BACKENDS)
    }

    /// Append an entry after the ones already added.
    pub fn push(mut self, entry: &'static str) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append an entry only when `enabled`.
    pub fn push_if(self, enabled: bool, entry: &'static str) -> Self {
        if enabled {
            self.push(entry)
        } else {
            self
        }
    }

    /// Entry that must come before everything else.
    pub fn pin_first(mut self, entry: &'static str) -> Self {
        self.first = Some(entry);
        self
    }

    /// Entry that must come after everything else.
    pub fn pin_last(mut self, entry: &'static str) -> Self {
        self.last = Some(entry);
        self
    }

    pub fn build(self) -> Vec<String> {
        self.first
            .into_iter()
            .chain(self.entries)
            .chain(self.last)
            .map(str::to_string)
            .collect()
    }
}
