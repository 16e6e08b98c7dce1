//! Settings names, defaults and fixed values.
//!
//! Centralized location for environment variable names and the values
//! that are not environment driven.

// =============================================================================
// Deployment
// =============================================================================

pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_SECRET_KEY: &str = "DJANGO_SECRET_KEY";
pub const ENV_HOSTED_SEATS_LIMIT: &str = "HOSTED_SEATS_LIMIT";
pub const ENV_ALLOWED_HOSTS: &str = "DJANGO_ALLOWED_HOSTS";
pub const ENV_CSRF_TRUSTED_ORIGINS: &str = "DJANGO_CSRF_TRUSTED_ORIGINS";
pub const ENV_ALLOWED_ADMIN_IP_ADDRESSES: &str = "ALLOWED_ADMIN_IP_ADDRESSES";

/// Environment names accepted without an advisory
pub const KNOWN_ENVIRONMENTS: &[&str] = &["local", "dev", "staging", "production"];

/// Default deployment environment
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Addresses treated as internal by the framework
pub const INTERNAL_IPS: &[&str] = &["127.0.0.1"];

pub const SITE_ID: u32 = 1;
pub const LANGUAGE_CODE: &str = "en-us";
pub const TIME_ZONE: &str = "UTC";
pub const STATIC_URL: &str = "/static/";
pub const LOGIN_URL: &str = "/admin/login/";
pub const LOGOUT_URL: &str = "/admin/logout/";
pub const ROOT_URLCONF: &str = "app.urls";
pub const WSGI_APPLICATION: &str = "app.wsgi.application";
pub const USE_I18N: bool = true;
pub const USE_L10N: bool = true;
pub const USE_TZ: bool = true;

/// Collected static files, relative to the settings package
pub const STATIC_ROOT: &str = "../../static/";

pub const TEMPLATE_BACKEND: &str = "django.template.backends.django.DjangoTemplates";
pub const TEMPLATE_CONTEXT_PROCESSORS: &[&str] = &[
    "django.template.context_processors.debug",
    "django.template.context_processors.request",
    "django.contrib.auth.context_processors.auth",
    "django.contrib.messages.context_processors.messages",
];

// API docs: a single API key passed in the Authorization header
pub const SWAGGER_SHOW_REQUEST_HEADERS: bool = true;
pub const SWAGGER_API_KEY_DEFINITION: &str = "api_key";
pub const SWAGGER_API_KEY_HEADER: &str = "Authorization";

/// Header and value marking a request as already TLS-terminated
pub const SECURE_PROXY_SSL_HEADER: (&str, &str) = ("HTTP_X_FORWARDED_PROTO", "https");

/// Applications that are always installed
pub const BASE_INSTALLED_APPS: &[&str] = &[
    "django.contrib.admin",
    "django.contrib.auth",
    "django.contrib.contenttypes",
    "django.contrib.sessions",
    "django.contrib.messages",
    "django.contrib.staticfiles",
    "rest_framework",
    "rest_framework.authtoken",
    "djoser",
    "django.contrib.sites",
    "custom_auth",
    "admin_sso",
    "api",
    "corsheaders",
    "users",
    "organisations",
    "projects",
    "sales_dashboard",
    "environments",
    "environments.permissions",
    "environments.identities",
    "environments.identities.traits",
    "features",
    "segments",
    "e2etests",
    "simple_history",
    "drf_yasg2",
    "audit",
    "permissions",
    "projects.tags",
    // 2FA
    "trench",
    "health_check",
    "health_check.db",
    // Model ordering, e.g. FeatureSegment
    "ordered_model",
    "integrations.datadog",
    "integrations.amplitude",
    "integrations.sentry",
    // Rate limiting admin endpoints
    "axes",
];

/// Installed when any analytics backend is configured
pub const ANALYTICS_APP: &str = "analytics";

// =============================================================================
// Secret key
// =============================================================================

/// Length of a generated fallback secret key
pub const SECRET_KEY_LENGTH: usize = 50;

/// Alphabet used for generated secret keys
pub const SECRET_KEY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

// =============================================================================
// Database
// =============================================================================

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Seconds a database connection may be reused
pub const DATABASE_CONN_MAX_AGE_SECONDS: u64 = 60;

// =============================================================================
// Analytics
// =============================================================================

pub const ENV_GOOGLE_ANALYTICS_KEY: &str = "GOOGLE_ANALYTICS_KEY";
pub const ENV_GOOGLE_SERVICE_ACCOUNT: &str = "GOOGLE_SERVICE_ACCOUNT";
pub const ENV_GA_TABLE_ID: &str = "GA_TABLE_ID";
pub const ENV_INFLUXDB_TOKEN: &str = "INFLUXDB_TOKEN";
pub const ENV_INFLUXDB_BUCKET: &str = "INFLUXDB_BUCKET";
pub const ENV_INFLUXDB_URL: &str = "INFLUXDB_URL";
pub const ENV_INFLUXDB_ORG: &str = "INFLUXDB_ORG";

// =============================================================================
// Cache
// =============================================================================

pub const ENV_CACHE_FLAGS_SECONDS: &str = "CACHE_FLAGS_SECONDS";
pub const ENV_CACHE_PROJECT_SEGMENTS_SECONDS: &str = "CACHE_PROJECT_SEGMENTS_SECONDS";

pub const DEFAULT_CACHE_LOCATION: &str = "unique-snowflake";
pub const ENVIRONMENT_CACHE_LOCATION: &str = "environment-objects";
pub const FLAGS_CACHE_LOCATION: &str = "environment-flags";
pub const PROJECT_SEGMENTS_CACHE_LOCATION: &str = "project-segments";

// =============================================================================
// Email
// =============================================================================

pub const ENV_SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const ENV_EMAIL_BACKEND: &str = "EMAIL_BACKEND";
pub const ENV_SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
pub const ENV_AWS_SES_REGION_NAME: &str = "AWS_SES_REGION_NAME";
pub const ENV_AWS_SES_REGION_ENDPOINT: &str = "AWS_SES_REGION_ENDPOINT";

pub const DEFAULT_FROM_EMAIL: &str = "noreply@bullet-train.io";
pub const SENDGRID_EMAIL_BACKEND: &str = "sgbackend.SendGridBackend";

/// Takes the inviter name and the organisation name
pub const INVITE_SUBJECT_WITH_NAME: &str =
    "%s has invited you to join the organisation '%s' on Bullet Train";

/// Takes the organisation name
pub const INVITE_SUBJECT_WITHOUT_NAME: &str =
    "You have been invited to join the organisation '%s' on Bullet Train";

// =============================================================================
// Authentication
// =============================================================================

pub const ENV_OAUTH_CLIENT_ID: &str = "OAUTH_CLIENT_ID";
pub const ENV_OAUTH_CLIENT_SECRET: &str = "OAUTH_CLIENT_SECRET";
pub const ENV_GITHUB_CLIENT_ID: &str = "GITHUB_CLIENT_ID";
pub const ENV_GITHUB_CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";
pub const ENV_USER_CREATE_PERMISSIONS: &str = "USER_CREATE_PERMISSIONS";
pub const ENV_ENABLE_EMAIL_ACTIVATION: &str = "ENABLE_EMAIL_ACTIVATION";

pub const AUTH_USER_MODEL: &str = "users.FFAdminUser";
pub const DEFAULT_USER_CREATE_PERMISSIONS: &[&str] = &["rest_framework.permissions.AllowAny"];

pub const PASSWORD_VALIDATORS: &[&str] = &[
    "django.contrib.auth.password_validation.UserAttributeSimilarityValidator",
    "django.contrib.auth.password_validation.MinimumLengthValidator",
    "django.contrib.auth.password_validation.CommonPasswordValidator",
    "django.contrib.auth.password_validation.NumericPasswordValidator",
];

// Used on init to create the site admin
pub const ALLOW_ADMIN_INITIATION_VIA_URL: bool = true;
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_INITIAL_PASSWORD: &str = "password";

// Account signup policy: email only, no verification step
pub const ACCOUNT_USERNAME_REQUIRED: bool = false;
pub const ACCOUNT_EMAIL_REQUIRED: bool = true;
pub const ACCOUNT_AUTHENTICATION_METHOD: &str = "email";
pub const ACCOUNT_EMAIL_VERIFICATION: &str = "none";

pub const PASSWORD_RESET_CONFIRM_URL: &str = "password-reset/confirm/{uid}/{token}";
pub const ACTIVATION_URL: &str = "activate/{uid}/{token}";

/// Serializer overrides for the account endpoints
pub const ACCOUNT_SERIALIZERS: &[(&str, &str)] = &[
    ("token", "custom_auth.serializers.CustomTokenSerializer"),
    ("user_create", "custom_auth.serializers.CustomUserCreateSerializer"),
    ("current_user", "users.serializers.CustomCurrentUserSerializer"),
];

pub const ACCOUNT_EMAILS: &[(&str, &str)] = &[
    ("activation", "users.emails.ActivationEmail"),
    ("confirmation", "users.emails.ConfirmationEmail"),
];

/// Who may view a user, or list users
pub const USER_PERMISSIONS: &[&str] = &["custom_auth.permissions.CurrentUser"];

/// User the front end uses for end to end tests
pub const FE_E2E_TEST_USER_EMAIL: &str = "nightwatch@solidstategroup.com";

// =============================================================================
// Rate limiting (Axes)
// =============================================================================

pub const ENV_ENABLE_AXES: &str = "ENABLE_AXES";
pub const ENV_AXES_COOLOFF_TIME: &str = "AXES_COOLOFF_TIME";

/// Minutes an address stays locked out
pub const DEFAULT_AXES_COOLOFF_MINUTES: i64 = 15;

pub const AXES_BLACKLISTED_URLS: &[&str] = &["/admin/login/?next=/admin", "/admin/"];

// =============================================================================
// Billing & error tracking
// =============================================================================

pub const ENV_ENABLE_CHARGEBEE: &str = "ENABLE_CHARGEBEE";
pub const ENV_CHARGEBEE_API_KEY: &str = "CHARGEBEE_API_KEY";
pub const ENV_CHARGEBEE_SITE: &str = "CHARGEBEE_SITE";
pub const ENV_SENTRY_SDK_DSN: &str = "SENTRY_SDK_DSN";
pub const ENV_SENTRY_TRACE_SAMPLE_RATE: &str = "SENTRY_TRACE_SAMPLE_RATE";

pub const DEFAULT_SENTRY_TRACE_SAMPLE_RATE: f64 = 1.0;

// =============================================================================
// Logging
// =============================================================================

pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "WARNING";

pub const LOG_CONSOLE_FORMAT: &str = "%(name)-12s %(levelname)-8s %(message)s";
pub const LOG_CONSOLE_HANDLER_LEVEL: &str = "DEBUG";

/// Logger levels; the empty name is the root logger
pub const LOGGER_LEVELS: &[(&str, &str)] = &[("django", "INFO"), ("", "DEBUG")];

// =============================================================================
// REST API
// =============================================================================

pub const API_PAGE_SIZE: u32 = 10;
pub const LOGIN_THROTTLE_RATE: &str = "1/s";

// =============================================================================
// CORS
// =============================================================================

/// Headers the CORS layer allows before project specific additions
pub const CORS_DEFAULT_HEADERS: &[&str] = &[
    "accept",
    "accept-encoding",
    "authorization",
    "content-type",
    "dnt",
    "origin",
    "user-agent",
    "x-csrftoken",
    "x-requested-with",
];

pub const CORS_EXTRA_HEADERS: &[&str] = &["X-Environment-Key", "X-E2E-Test-Auth-Token"];

// =============================================================================
// Two-factor authentication
// =============================================================================

pub const MFA_BACKUP_CODES_QUANTITY: u32 = 5;
/// Keep quantity * length under 200
pub const MFA_BACKUP_CODES_LENGTH: u32 = 10;
pub const MFA_BACKUP_CODES_CHARACTERS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const MFA_DEFAULT_VALIDITY_SECONDS: u32 = 30;
pub const MFA_APPLICATION_ISSUER_NAME: &str = "app.bullet-train.io";
pub const MFA_APP_VALIDITY_SECONDS: u32 = 60 * 10;
pub const MFA_APP_HANDLER: &str = "custom_auth.mfa.backends.application.CustomApplicationBackend";

// =============================================================================
// Instance metadata
// =============================================================================

/// Endpoint returning the host's private IPv4 address on cloud instances
pub const INSTANCE_METADATA_LOCAL_IPV4_URL: &str =
    "http://instance-data/latest/meta-data/local-ipv4";

pub const INSTANCE_METADATA_TIMEOUT_MS: u64 = 1000;
