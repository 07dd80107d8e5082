use chrono::{DateTime, Utc};
use domain::models::{EventCatalog, EventDetails, SubEvent};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub rsvp: RsvpConfig,
    /// Email service configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Overrides applied on top of the default event catalog
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-client limit for the public guest routes; 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Only enable behind proper HTTPS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RsvpConfig {
    /// Bound on every guest directory search and on the submission insert batch
    #[serde(default = "default_directory_timeout")]
    pub directory_timeout_secs: u64,

    /// Bound on one notification dispatch (both emails)
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_secs: u64,

    /// Wizard sessions idle longer than this are evicted
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Limit for dietary restrictions and messages
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

impl RsvpConfig {
    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    60
}
fn default_directory_timeout() -> u64 {
    10
}
fn default_notification_timeout() -> u64 {
    15
}
fn default_session_ttl() -> u64 {
    60
}
fn default_max_sessions() -> usize {
    10_000
}
fn default_max_text_length() -> usize {
    shared::validation::DEFAULT_MAX_TEXT_LENGTH
}

/// Email service configuration for RSVP notifications and confirmations.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email sending is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: console (development), resend or sendgrid
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default)]
    pub resend_api_key: String,

    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name used on guest confirmations
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// The couple's addresses that receive every new RSVP
    #[serde(default)]
    pub notification_recipients: Vec<String>,

    /// Public site URL linked from confirmation emails
    #[serde(default)]
    pub site_url: String,

    /// Email template style: html or plain
    #[serde(default = "default_template_style")]
    pub template_style: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            resend_api_key: String::new(),
            sendgrid_api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            notification_recipients: Vec::new(),
            site_url: String::new(),
            template_style: default_template_style(),
        }
    }
}

impl EmailConfig {
    /// API key for the configured HTTPS provider, if it needs one.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider.as_str() {
            "resend" => Some(&self.resend_api_key),
            "sendgrid" => Some(&self.sendgrid_api_key),
            _ => None,
        }
    }
}

fn default_email_provider() -> String {
    "console".to_string()
}

fn default_sender_email() -> String {
    "noreply@example.com".to_string()
}

fn default_sender_name() -> String {
    "Wedding RSVP".to_string()
}

fn default_template_style() -> String {
    "html".to_string()
}

/// Partial override of one event's details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventOverride {
    pub title: Option<String>,
    pub schedule: Option<String>,
    pub venue: Option<String>,
    pub address: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl EventOverride {
    fn apply(&self, details: &mut EventDetails) {
        if let Some(title) = &self.title {
            details.title = title.clone();
        }
        if let Some(schedule) = &self.schedule {
            details.schedule = schedule.clone();
        }
        if let Some(venue) = &self.venue {
            details.venue = venue.clone();
        }
        if let Some(address) = &self.address {
            details.address = address.clone();
        }
        if let Some(starts_at) = self.starts_at {
            details.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            details.ends_at = ends_at;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub rehearsal_dinner: Option<EventOverride>,
    #[serde(default)]
    pub welcome_party: Option<EventOverride>,
    #[serde(default)]
    pub ceremony_reception: Option<EventOverride>,
}

impl EventsConfig {
    fn override_for(&self, event: SubEvent) -> Option<&EventOverride> {
        match event {
            SubEvent::RehearsalDinner => self.rehearsal_dinner.as_ref(),
            SubEvent::WelcomeParty => self.welcome_party.as_ref(),
            SubEvent::CeremonyReception => self.ceremony_reception.as_ref(),
        }
    }

    /// The default catalog with any configured overrides applied.
    pub fn catalog(&self) -> EventCatalog {
        let mut catalog = EventCatalog::default();
        if let Some(o) = &self.rehearsal_dinner {
            o.apply(&mut catalog.rehearsal_dinner);
        }
        if let Some(o) = &self.welcome_party {
            o.apply(&mut catalog.welcome_party);
        }
        if let Some(o) = &self.ceremony_reception {
            o.apply(&mut catalog.ceremony_reception);
        }
        catalog
    }
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RSVP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("RSVP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .with_list_parse_key("email.notification_recipients")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds entirely from embedded defaults so tests never depend on the
    /// working directory.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 10
            min_connections = 2
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 0
            hsts_enabled = false

            [rsvp]
            directory_timeout_secs = 10
            notification_timeout_secs = 15
            session_ttl_minutes = 60
            max_sessions = 10000
            max_text_length = 1000

            [email]
            enabled = false
            provider = "console"
            sender_email = "test@example.com"
            sender_name = "Test"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so tests can build partial configs
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        let timeouts = [
            ("server.request_timeout_secs", self.server.request_timeout_secs),
            ("rsvp.directory_timeout_secs", self.rsvp.directory_timeout_secs),
            ("rsvp.notification_timeout_secs", self.rsvp.notification_timeout_secs),
            ("rsvp.session_ttl_minutes", self.rsvp.session_ttl_minutes),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "{} must be greater than 0",
                name
            )));
        }

        // A request cut off mid-submission cannot report the failure.
        if self.server.request_timeout_secs <= self.rsvp.directory_timeout_secs {
            return Err(ConfigValidationError::InvalidValue(format!(
                "server.request_timeout_secs ({}) must be greater than rsvp.directory_timeout_secs ({})",
                self.server.request_timeout_secs, self.rsvp.directory_timeout_secs
            )));
        }

        if self.rsvp.max_text_length == 0 || self.rsvp.max_sessions == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "rsvp.max_text_length and rsvp.max_sessions must be greater than 0".to_string(),
            ));
        }

        if self.email.enabled {
            match self.email.provider.as_str() {
                "console" => {}
                "resend" | "sendgrid" => {
                    if self.email.api_key().map_or(true, str::is_empty) {
                        return Err(ConfigValidationError::MissingRequired(format!(
                            "email.{}_api_key must be set for the {} provider",
                            self.email.provider, self.email.provider
                        )));
                    }
                }
                other => {
                    return Err(ConfigValidationError::InvalidValue(format!(
                        "Unknown email provider: {}",
                        other
                    )));
                }
            }
        }

        for event in SubEvent::ALL {
            let Some(o) = self.events.override_for(event) else {
                continue;
            };
            if let (Some(starts_at), Some(ends_at)) = (o.starts_at, o.ends_at) {
                if ends_at <= starts_at {
                    return Err(ConfigValidationError::InvalidValue(format!(
                        "events.{}.ends_at must be after starts_at",
                        event
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
