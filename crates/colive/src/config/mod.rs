use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;

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
    pub pricing: PricingConfig,
    pub wizard: WizardConfig,
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

        let member_discount_percent =
            percent_var("APP_MEMBER_DISCOUNT_PERCENT", PricingConfig::DEFAULT_MEMBER_DISCOUNT)?;
        let guest_increase_percent =
            percent_var("APP_GUEST_INCREASE_PERCENT", PricingConfig::DEFAULT_GUEST_INCREASE)?;

        let max_initial_stay_days = match env::var("APP_MAX_INITIAL_STAY_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidStayLimit(raw))?,
            Err(_) => WizardConfig::default().max_initial_stay_days,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing: PricingConfig {
                member_discount_percent,
                guest_increase_percent,
            },
            wizard: WizardConfig {
                max_initial_stay_days,
                ..WizardConfig::default()
            },
        })
    }
}

fn percent_var(name: &'static str, default: Decimal) -> Result<Decimal, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| !value.is_sign_negative() && *value <= Decimal::ONE_HUNDRED)
        .ok_or(ConfigError::InvalidPercentage { name, value: raw })
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
}

/// Percentages applied on top of a chapter's base stay cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    pub member_discount_percent: Decimal,
    pub guest_increase_percent: Decimal,
}

impl PricingConfig {
    pub const DEFAULT_MEMBER_DISCOUNT: Decimal = Decimal::from_parts(300, 0, 0, false, 2);
    pub const DEFAULT_GUEST_INCREASE: Decimal = Decimal::from_parts(2000, 0, 0, false, 2);
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            member_discount_percent: Self::DEFAULT_MEMBER_DISCOUNT,
            guest_increase_percent: Self::DEFAULT_GUEST_INCREASE,
        }
    }
}

/// Limits and notices applied while an applicant picks dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    pub max_initial_stay_days: i64,
    pub short_stay_notice_days: i64,
    pub long_stay_notice_days: i64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_initial_stay_days: 93,
            short_stay_notice_days: 28,
            long_stay_notice_days: 93,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPercentage { name: &'static str, value: String },
    InvalidStayLimit(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPercentage { name, value } => {
                write!(f, "{name} must be a percentage between 0 and 100, got '{value}'")
            }
            ConfigError::InvalidStayLimit(value) => write!(
                f,
                "APP_MAX_INITIAL_STAY_DAYS must be a positive number of days, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPercentage { .. }
            | ConfigError::InvalidStayLimit(_) => None,
        }
    }
}
