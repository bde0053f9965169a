//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use chrono::FixedOffset;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_REPORT_URL: &str =
        "https://raw.githubusercontent.com/faruklmu17/browser_extension_test/refs/heads/main/tests/test-results.json";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_FETCH_TIMEOUT_SECS: u64 = 20;
    /// UTC-05:00 (US Eastern standard time) for last-run display.
    pub const DEV_TZ_OFFSET_MINUTES: i32 = -300;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// URL of the raw test-run report JSON
    pub report_url: String,
    /// Total timeout for one report fetch
    pub fetch_timeout: Duration,
    /// Display offset for last-run timestamps, minutes east of UTC
    pub tz_offset_minutes: i32,
    /// Allowed CORS origin (production only; development allows localhost)
    pub cors_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) all variables have
    /// sensible defaults; only RUST_ENV is required. In production mode
    /// RIS_REPORT_URL must be set to a non-default value.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `RIS_HOST`: Server host (default: 127.0.0.1)
    /// - `RIS_PORT`: Server port (default: 8080)
    /// - `RIS_REPORT_URL`: Raw report JSON URL (required in production)
    /// - `RIS_FETCH_TIMEOUT_SECS`: Report fetch timeout (default: 20)
    /// - `RIS_TZ_OFFSET_MINUTES`: Last-run display offset in minutes east
    ///   of UTC (default: -300)
    /// - `RIS_CORS_ORIGIN`: Allowed CORS origin in production
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("RIS_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("RIS_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("RIS_PORT must be a valid port number"))?;

        let report_url =
            env::var("RIS_REPORT_URL").unwrap_or_else(|_| defaults::DEV_REPORT_URL.to_string());

        let fetch_timeout_secs = env::var("RIS_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::DEV_FETCH_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("RIS_FETCH_TIMEOUT_SECS must be a valid number")
            })?;

        let tz_offset_minutes = env::var("RIS_TZ_OFFSET_MINUTES")
            .unwrap_or_else(|_| defaults::DEV_TZ_OFFSET_MINUTES.to_string())
            .parse::<i32>()
            .map_err(|_| {
                ConfigError::InvalidValue("RIS_TZ_OFFSET_MINUTES must be a valid number")
            })?;

        if tz_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue(
                "RIS_TZ_OFFSET_MINUTES must be within one day of UTC",
            ));
        }

        let cors_origin = env::var("RIS_CORS_ORIGIN").ok();

        let config = Config {
            environment,
            host,
            port,
            report_url,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            tz_offset_minutes,
            cors_origin,
        };

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development
    /// defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.report_url == defaults::DEV_REPORT_URL {
            errors.push(format!(
                "RIS_REPORT_URL is using the development default '{}'. Point it at your own report.",
                defaults::DEV_REPORT_URL
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Display offset for last-run answers.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_config() -> Config {
        Config {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 3000,
            report_url: defaults::DEV_REPORT_URL.to_string(),
            fetch_timeout: Duration::from_secs(20),
            tz_offset_minutes: -300,
            cors_origin: None,
        }
    }

    #[test]
    fn test_bind_address() {
        let config = dev_config();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::parse("development"),
            Some(Environment::Development)
        );
        assert_eq!(Environment::parse("dev"), Some(Environment::Development));
        assert_eq!(
            Environment::parse("production"),
            Some(Environment::Production)
        );
        assert_eq!(Environment::parse("prod"), Some(Environment::Production));
        assert_eq!(Environment::parse("invalid"), None);
    }

    #[test]
    fn test_display_offset_minutes_east() {
        let mut config = dev_config();
        config.tz_offset_minutes = 120;
        assert_eq!(config.display_offset().local_minus_utc(), 120 * 60);

        config.tz_offset_minutes = -300;
        assert_eq!(config.display_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_production_validation_fails_with_dev_report_url() {
        let mut config = dev_config();
        config.environment = Environment::Production;

        let result = config.validate_production();
        assert!(result.is_err());
    }

    #[test]
    fn test_production_validation_passes_with_proper_config() {
        let mut config = dev_config();
        config.environment = Environment::Production;
        config.report_url = "https://ci.example.com/reports/latest.json".to_string();

        assert!(config.validate_production().is_ok());
    }
}
