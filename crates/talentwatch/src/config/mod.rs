use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::tracking::domain::AlertLevel;
use crate::tracking::{ClassifierConfig, TrackingConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub tracking: TrackingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        );

        let tracking = load_tracking()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            tracking,
        })
    }
}

fn load_tracking() -> Result<TrackingConfig, ConfigError> {
    let min_alert_level = match env::var("TRACKING_MIN_ALERT_LEVEL") {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<u8>()
                .map_err(|_| ConfigError::InvalidAlertLevel { value: raw.clone() })?;
            AlertLevel::from_value(value)
                .ok_or(ConfigError::InvalidAlertLevel { value: raw })?
        }
        Err(_) => AlertLevel::Watch,
    };

    let notify_as_test = env::var("TRACKING_NOTIFY_TEST")
        .map(|raw| matches!(raw.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let mut classifier = ClassifierConfig::default();
    if let Ok(raw) = env::var("TRACKING_FOUNDING_WINDOW_YEARS") {
        classifier.recent_founding_window_years = raw
            .trim()
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidFoundingWindow { value: raw })?;
    }

    Ok(TrackingConfig {
        classifier,
        min_alert_level,
        notify_as_test,
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Log output shape: compact text for people, JSON lines for shippers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAlertLevel { value: String },
    InvalidFoundingWindow { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAlertLevel { value } => {
                write!(f, "TRACKING_MIN_ALERT_LEVEL must be 1, 2, or 3 (got '{value}')")
            }
            ConfigError::InvalidFoundingWindow { value } => {
                write!(
                    f,
                    "TRACKING_FOUNDING_WINDOW_YEARS must be an integer (got '{value}')"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
