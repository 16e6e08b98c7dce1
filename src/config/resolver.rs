//! Settings resolution.
//!
//! A single linear pass over the environment: every setting is read
//! once, checked, and folded into [`Settings`]. Misconfiguration that
//! leaves no usable value is an error; everything else is an advisory.

use std::collections::BTreeMap;

use rand::Rng;

use super::advisory::{Advisories, Advisory};
use super::constants::*;
use super::database::DatabaseConfig;
use super::env::EnvVars;
use super::pipeline::{
    PipelineBuilder, ADMIN_WHITELIST_MIDDLEWARE, AXES_BACKEND, AXES_MIDDLEWARE,
    GOOGLE_ANALYTICS_MIDDLEWARE, INFLUXDB_MIDDLEWARE,
};
use super::secret::Secret;
use super::settings::*;
use crate::errors::{SettingsError, SettingsResult};
use crate::infra::{InstanceMetadataProbe, MetadataProbe};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub settings: Settings,
    /// Warnings raised along the way, in the order they were raised
    pub advisories: Vec<Advisory>,
}

/// Turns an environment snapshot into [`Settings`].
pub struct Resolver<P = InstanceMetadataProbe> {
    probe: P,
}

impl Resolver {
    /// Resolver that asks the instance metadata endpoint for the host address.
    pub fn new() -> Self {
        Self::with_probe(InstanceMetadataProbe::default())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: MetadataProbe> Resolver<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Resolve every recognised setting.
    ///
    /// # Errors
    /// Returns an error if `DATABASE_URL` is missing or invalid, or if a
    /// typed setting holds a value that does not parse.
    pub fn resolve(&self, env: &EnvVars) -> SettingsResult<Resolution> {
        let mut advisories = Advisories::default();

        let environment =
            DeploymentEnvironment::parse(&env.string(ENV_ENVIRONMENT, DEFAULT_ENVIRONMENT));
        if !environment.is_known() {
            advisories.warn(
                ENV_ENVIRONMENT,
                format!(
                    "ENVIRONMENT env variable must be one of {}, got '{}'",
                    KNOWN_ENVIRONMENTS.join(", "),
                    environment
                ),
            );
        }

        let debug = env.bool(ENV_DEBUG, false)?;
        let secret_key = match env.optional(ENV_SECRET_KEY) {
            Some(key) => Secret::new(key),
            None => {
                tracing::debug!("DJANGO_SECRET_KEY not set, generated a key for this process");
                generate_secret_key()
            }
        };
        let hosted_seats_limit = env.int(ENV_HOSTED_SEATS_LIMIT, 0)?;

        let google_analytics = google_analytics(env, &mut advisories);
        let influxdb = influxdb(env, &mut advisories);

        let mut allowed_hosts = env.list(ENV_ALLOWED_HOSTS, &[]);
        let csrf_trusted_origins = env.list(ENV_CSRF_TRUSTED_ORIGINS, &[]);
        if let Some(address) = self.probe.local_ipv4() {
            allowed_hosts.push(address);
        }

        let analytics_enabled = !google_analytics.key.is_empty() || influxdb.is_enabled();
        let mut installed_apps: Vec<String> =
            BASE_INSTALLED_APPS.iter().map(|app| app.to_string()).collect();
        if analytics_enabled {
            installed_apps.push(ANALYTICS_APP.to_string());
        }

        let database = match env.get(ENV_DATABASE_URL) {
            Some(raw) => DatabaseConfig::parse(raw)?,
            None => return Err(SettingsError::Missing { name: ENV_DATABASE_URL }),
        };

        let allowed_admin_ip_addresses = env.list(ENV_ALLOWED_ADMIN_IP_ADDRESSES, &[]);
        if !allowed_admin_ip_addresses.is_empty() {
            advisories.warn(
                ENV_ALLOWED_ADMIN_IP_ADDRESSES,
                format!(
                    "Restricting access to the admin site for ip addresses {}",
                    allowed_admin_ip_addresses.join(", ")
                ),
            );
        }

        let admin_sso_oauth = oauth_client(
            env,
            ENV_OAUTH_CLIENT_ID,
            ENV_OAUTH_CLIENT_SECRET,
            &mut advisories,
        );
        let github_oauth = oauth_client(
            env,
            ENV_GITHUB_CLIENT_ID,
            ENV_GITHUB_CLIENT_SECRET,
            &mut advisories,
        );

        let email = email(env, &mut advisories);
        let chargebee = chargebee(env, &mut advisories)?;
        let caches = caches(env)?;
        let logging = logging(env, &mut advisories);
        let accounts = accounts(env)?;
        let sentry = sentry(env, &mut advisories)?;

        let axes = if env.bool(ENV_ENABLE_AXES, false)? {
            Some(AxesConfig {
                cooloff_minutes: axes_cooloff_minutes(env)?,
                blacklisted_urls: to_strings(AXES_BLACKLISTED_URLS),
            })
        } else {
            None
        };

        let mut middleware = PipelineBuilder::middleware()
            .push_if(!google_analytics.key.is_empty(), GOOGLE_ANALYTICS_MIDDLEWARE)
            .push_if(influxdb.is_enabled(), INFLUXDB_MIDDLEWARE)
            .push_if(
                !allowed_admin_ip_addresses.is_empty(),
                ADMIN_WHITELIST_MIDDLEWARE,
            );
        let mut authentication_backends = PipelineBuilder::authentication_backends();
        if axes.is_some() {
            middleware = middleware.pin_last(AXES_MIDDLEWARE);
            authentication_backends = authentication_backends.pin_first(AXES_BACKEND);
        }

        let mut integrations = Vec::new();
        if !google_analytics.key.is_empty() {
            integrations.push(Integration::GoogleAnalytics);
        }
        if influxdb.is_enabled() {
            integrations.push(Integration::InfluxDb);
        }
        if sentry.dsn.is_some() {
            integrations.push(Integration::Sentry);
        }
        if chargebee.enabled && chargebee.api_key.is_some() && chargebee.site.is_some() {
            integrations.push(Integration::Chargebee);
        }
        if github_oauth.is_configured() {
            integrations.push(Integration::GithubOAuth);
        }
        if email.backend == SENDGRID_EMAIL_BACKEND && email.sendgrid_api_key.is_some() {
            integrations.push(Integration::SendGrid);
        }

        let mfa = mfa(&email.default_from_email);

        let settings = Settings {
            environment,
            debug,
            secret_key,
            hosted_seats_limit,
            allowed_hosts,
            csrf_trusted_origins,
            internal_ips: to_strings(INTERNAL_IPS),
            allowed_admin_ip_addresses,
            installed_apps,
            integrations,
            middleware: middleware.build(),
            authentication_backends: authentication_backends.build(),
            database,
            caches,
            email,
            google_analytics,
            influxdb,
            admin_sso_oauth,
            github_oauth,
            axes,
            chargebee,
            sentry,
            rest_framework: rest_framework(),
            cors: cors(),
            mfa,
            accounts,
            account_policy: account_policy(),
            logging,
            admin_bootstrap: AdminBootstrap {
                allow_initiation_via_url: ALLOW_ADMIN_INITIATION_VIA_URL,
                email: ADMIN_EMAIL.to_string(),
                initial_password: Secret::new(ADMIN_INITIAL_PASSWORD),
            },
            password_validators: to_strings(PASSWORD_VALIDATORS),
            templates: templates(),
            swagger: swagger(),
            site_id: SITE_ID,
            root_urlconf: ROOT_URLCONF.to_string(),
            wsgi_application: WSGI_APPLICATION.to_string(),
            auth_user_model: AUTH_USER_MODEL.to_string(),
            language_code: LANGUAGE_CODE.to_string(),
            time_zone: TIME_ZONE.to_string(),
            use_i18n: USE_I18N,
            use_l10n: USE_L10N,
            use_tz: USE_TZ,
            static_url: STATIC_URL.to_string(),
            static_root: STATIC_ROOT.to_string(),
            login_url: LOGIN_URL.to_string(),
            logout_url: LOGOUT_URL.to_string(),
            secure_proxy_ssl_header: (
                SECURE_PROXY_SSL_HEADER.0.to_string(),
                SECURE_PROXY_SSL_HEADER.1.to_string(),
            ),
            fe_e2e_test_user_email: FE_E2E_TEST_USER_EMAIL.to_string(),
        };

        Ok(Resolution {
            settings,
            advisories: advisories.into_vec(),
        })
    }
}

impl Settings {
    /// Load settings from the process environment (and `.env`, if present).
    ///
    /// Advisories are logged as warnings and then dropped.
    pub fn from_env() -> SettingsResult<Self> {
        Resolver::new()
            .resolve(&EnvVars::from_process())
            .map(|resolution| resolution.settings)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn to_string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn generate_secret_key() -> Secret {
    let mut rng = rand::thread_rng();
    let key: String = (0..SECRET_KEY_LENGTH)
        .map(|_| SECRET_KEY_CHARS[rng.gen_range(0..SECRET_KEY_CHARS.len())] as char)
        .collect();
    Secret::new(key)
}

/// Lockout minutes, limited to what fits a `Duration` in whole seconds.
fn axes_cooloff_minutes(env: &EnvVars) -> SettingsResult<u64> {
    let minutes = env.int(ENV_AXES_COOLOFF_TIME, DEFAULT_AXES_COOLOFF_MINUTES)?;
    u64::try_from(minutes)
        .ok()
        .filter(|minutes| minutes.checked_mul(60).is_some())
        .ok_or_else(|| {
            SettingsError::parse(
                ENV_AXES_COOLOFF_TIME,
                minutes.to_string(),
                "non-negative number of minutes",
            )
        })
}

fn google_analytics(env: &EnvVars, advisories: &mut Advisories) -> GoogleAnalyticsConfig {
    let service_account = env.optional(ENV_GOOGLE_SERVICE_ACCOUNT).map(Secret::new);
    if service_account.is_none() {
        advisories.warn(
            ENV_GOOGLE_SERVICE_ACCOUNT,
            "GOOGLE_SERVICE_ACCOUNT not configured, getting organisation usage will not work",
        );
    }

    let table_id = env.optional(ENV_GA_TABLE_ID);
    if table_id.is_none() {
        advisories.warn(
            ENV_GA_TABLE_ID,
            "GA_TABLE_ID not configured, getting organisation usage will not work",
        );
    }

    GoogleAnalyticsConfig {
        key: env.string(ENV_GOOGLE_ANALYTICS_KEY, ""),
        service_account,
        table_id,
    }
}

fn influxdb(env: &EnvVars, advisories: &mut Advisories) -> InfluxDbConfig {
    let config = InfluxDbConfig {
        token: Secret::new(env.string(ENV_INFLUXDB_TOKEN, "")),
        bucket: env.string(ENV_INFLUXDB_BUCKET, ""),
        url: env.string(ENV_INFLUXDB_URL, ""),
        org: env.string(ENV_INFLUXDB_ORG, ""),
    };

    if config.is_enabled() {
        let missing: Vec<&str> = [
            (ENV_INFLUXDB_BUCKET, &config.bucket),
            (ENV_INFLUXDB_URL, &config.url),
            (ENV_INFLUXDB_ORG, &config.org),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            advisories.warn(
                ENV_INFLUXDB_TOKEN,
                format!(
                    "INFLUXDB_TOKEN is set but {} not configured, metrics will not be written",
                    missing.join(", ")
                ),
            );
        }
    }

    config
}

fn oauth_client(
    env: &EnvVars,
    id_name: &'static str,
    secret_name: &'static str,
    advisories: &mut Advisories,
) -> OAuthClient {
    let client = OAuthClient {
        client_id: env.string(id_name, ""),
        client_secret: Secret::new(env.string(secret_name, "")),
    };

    match (client.client_id.is_empty(), client.client_secret.is_empty()) {
        (false, true) => advisories.warn(
            secret_name,
            format!("{} is set but {} is not, OAuth login will not work", id_name, secret_name),
        ),
        (true, false) => advisories.warn(
            id_name,
            format!("{} is set but {} is not, OAuth login will not work", secret_name, id_name),
        ),
        _ => {}
    }

    client
}

fn email(env: &EnvVars, advisories: &mut Advisories) -> EmailConfig {
    let default_from_email = env.string(ENV_SENDER_EMAIL, DEFAULT_FROM_EMAIL);
    let backend = env.string(ENV_EMAIL_BACKEND, SENDGRID_EMAIL_BACKEND);
    let sendgrid_api_key = env.optional(ENV_SENDGRID_API_KEY).map(Secret::new);

    if backend == SENDGRID_EMAIL_BACKEND && sendgrid_api_key.is_none() {
        advisories.warn(
            ENV_SENDGRID_API_KEY,
            "`SENDGRID_API_KEY` has not been configured. You will not receive emails.",
        );
    }

    EmailConfig {
        backend,
        sendgrid_api_key,
        invite_from_email: default_from_email.clone(),
        default_from_email,
        invite_subject_with_name: INVITE_SUBJECT_WITH_NAME,
        invite_subject_without_name: INVITE_SUBJECT_WITHOUT_NAME,
        aws_ses_region_name: env.optional(ENV_AWS_SES_REGION_NAME),
        aws_ses_region_endpoint: env.optional(ENV_AWS_SES_REGION_ENDPOINT),
    }
}

fn chargebee(env: &EnvVars, advisories: &mut Advisories) -> SettingsResult<ChargebeeConfig> {
    let config = ChargebeeConfig {
        enabled: env.bool(ENV_ENABLE_CHARGEBEE, false)?,
        api_key: env.optional(ENV_CHARGEBEE_API_KEY).map(Secret::new),
        site: env.optional(ENV_CHARGEBEE_SITE),
    };

    if config.enabled && (config.api_key.is_none() || config.site.is_none()) {
        advisories.warn(
            ENV_ENABLE_CHARGEBEE,
            "ENABLE_CHARGEBEE is set but CHARGEBEE_API_KEY or CHARGEBEE_SITE is missing, billing is disabled",
        );
    }

    Ok(config)
}

fn caches(env: &EnvVars) -> SettingsResult<CachesConfig> {
    let backends = [
        ("default", DEFAULT_CACHE_LOCATION),
        (ENVIRONMENT_CACHE_LOCATION, ENVIRONMENT_CACHE_LOCATION),
        (FLAGS_CACHE_LOCATION, FLAGS_CACHE_LOCATION),
        (PROJECT_SEGMENTS_CACHE_LOCATION, PROJECT_SEGMENTS_CACHE_LOCATION),
    ]
    .into_iter()
    .map(|(name, location)| (name.to_string(), CacheConfig::local_memory(location)))
    .collect();

    Ok(CachesConfig {
        backends,
        flags_seconds: env.int(ENV_CACHE_FLAGS_SECONDS, 0)?,
        project_segments_seconds: env.int(ENV_CACHE_PROJECT_SEGMENTS_SECONDS, 0)?,
        flags_location: FLAGS_CACHE_LOCATION.to_string(),
        environment_location: ENVIRONMENT_CACHE_LOCATION.to_string(),
        project_segments_location: PROJECT_SEGMENTS_CACHE_LOCATION.to_string(),
    })
}

fn logging(env: &EnvVars, advisories: &mut Advisories) -> LoggingConfig {
    let level = env.string(ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL);
    if LoggingConfig::directive_for(&level).is_none() {
        advisories.warn(
            ENV_LOG_LEVEL,
            format!("LOG_LEVEL '{}' is not a known level, logging at WARNING", level),
        );
    }
    LoggingConfig {
        level,
        disable_existing_loggers: false,
        console_format: LOG_CONSOLE_FORMAT.to_string(),
        console_level: LOG_CONSOLE_HANDLER_LEVEL.to_string(),
        loggers: to_string_map(LOGGER_LEVELS),
    }
}

fn accounts(env: &EnvVars) -> SettingsResult<AccountsConfig> {
    Ok(AccountsConfig {
        password_reset_confirm_url: PASSWORD_RESET_CONFIRM_URL.to_string(),
        send_activation_email: env.bool(ENV_ENABLE_EMAIL_ACTIVATION, false)?,
        activation_url: ACTIVATION_URL.to_string(),
        send_confirmation_email: false,
        set_password_retype: true,
        password_reset_confirm_retype: true,
        hide_users: true,
        serializers: to_string_map(ACCOUNT_SERIALIZERS),
        emails: to_string_map(ACCOUNT_EMAILS),
        user_permissions: to_strings(USER_PERMISSIONS),
        user_list_permissions: to_strings(USER_PERMISSIONS),
        user_create_permissions: env.list(
            ENV_USER_CREATE_PERMISSIONS,
            DEFAULT_USER_CREATE_PERMISSIONS,
        ),
    })
}

fn account_policy() -> AccountPolicy {
    AccountPolicy {
        username_required: ACCOUNT_USERNAME_REQUIRED,
        email_required: ACCOUNT_EMAIL_REQUIRED,
        authentication_method: ACCOUNT_AUTHENTICATION_METHOD.to_string(),
        email_verification: ACCOUNT_EMAIL_VERIFICATION.to_string(),
    }
}

fn templates() -> Vec<TemplateConfig> {
    vec![TemplateConfig {
        backend: TEMPLATE_BACKEND.to_string(),
        dirs: Vec::new(),
        app_dirs: true,
        context_processors: to_strings(TEMPLATE_CONTEXT_PROCESSORS),
    }]
}

fn swagger() -> SwaggerConfig {
    let api_key = SecurityDefinition {
        kind: "apiKey".to_string(),
        location: "header".to_string(),
        name: SWAGGER_API_KEY_HEADER.to_string(),
    };
    SwaggerConfig {
        show_request_headers: SWAGGER_SHOW_REQUEST_HEADERS,
        security_definitions: BTreeMap::from([(SWAGGER_API_KEY_DEFINITION.to_string(), api_key)]),
    }
}

fn sentry(env: &EnvVars, advisories: &mut Advisories) -> SettingsResult<SentryConfig> {
    let trace_sample_rate =
        env.float(ENV_SENTRY_TRACE_SAMPLE_RATE, DEFAULT_SENTRY_TRACE_SAMPLE_RATE)?;
    if !(0.0..=1.0).contains(&trace_sample_rate) {
        advisories.warn(
            ENV_SENTRY_TRACE_SAMPLE_RATE,
            format!(
                "SENTRY_TRACE_SAMPLE_RATE should be between 0.0 and 1.0, got {}",
                trace_sample_rate
            ),
        );
    }

    Ok(SentryConfig {
        dsn: env.optional(ENV_SENTRY_SDK_DSN).map(Secret::new),
        trace_sample_rate,
    })
}

fn rest_framework() -> RestFrameworkConfig {
    RestFrameworkConfig {
        default_permission_classes: to_strings(&["rest_framework.permissions.IsAuthenticated"]),
        default_authentication_classes: to_strings(&[
            "rest_framework.authentication.TokenAuthentication",
        ]),
        page_size: API_PAGE_SIZE,
        unicode_json: false,
        default_pagination_class: "rest_framework.pagination.PageNumberPagination".to_string(),
        throttle_rates: BTreeMap::from([("login".to_string(), LOGIN_THROTTLE_RATE.to_string())]),
    }
}

fn cors() -> CorsConfig {
    CorsConfig {
        origin_allow_all: true,
        allow_headers: CORS_DEFAULT_HEADERS
            .iter()
            .chain(CORS_EXTRA_HEADERS)
            .map(|header| header.to_string())
            .collect(),
    }
}

fn mfa(from_email: &str) -> MfaConfig {
    let app = MfaMethod {
        verbose_name: "TOTP App".to_string(),
        validity_period_seconds: MFA_APP_VALIDITY_SECONDS,
        uses_third_party_client: true,
        handler: MFA_APP_HANDLER.to_string(),
    };

    MfaConfig {
        from_email: from_email.to_string(),
        backup_codes_quantity: MFA_BACKUP_CODES_QUANTITY,
        backup_codes_length: MFA_BACKUP_CODES_LENGTH,
        backup_codes_characters: MFA_BACKUP_CODES_CHARACTERS.to_string(),
        default_validity_period_seconds: MFA_DEFAULT_VALIDITY_SECONDS,
        confirm_backup_codes_regeneration_with_code: true,
        application_issuer_name: MFA_APPLICATION_ISSUER_NAME.to_string(),
        methods: BTreeMap::from([("app".to_string(), app)]),
    }
}
