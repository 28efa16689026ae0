//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use motorbay_domain::CalendarZone;
use motorbay_store::{PersistenceAdapter, PersistenceMode};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Reservation storage configuration
    pub storage: StorageConfig,

    /// Login gate configuration
    pub auth: AuthConfig,

    /// Artificial delay before each reservation handler
    pub mock_latency: Duration,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Reservation storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding slot files (ignored in the test environment)
    pub data_dir: PathBuf,
    /// Slot key for the reservation collection
    pub key: String,
    /// What an empty slot is seeded with
    pub seed: SeedKind,
    /// Zone used for calendar-day filtering
    pub zone: CalendarZone,
    /// Behavior on failed durable writes
    pub mode: PersistenceMode,
}

/// Seed set for an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    /// Built-in demo reservations
    Fixtures,
    /// Start with nothing
    Empty,
}

/// The single accepted login.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Accepted email
    pub email: String,
    /// Accepted password
    pub password: String,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (memory slot)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let storage = Self::load_storage_config()?;
        let auth = Self::load_auth_config();
        let latency_ms = Self::load_parsed_env("MOTORBAY_MOCK_LATENCY_MS", 0u64)?;
        let mock_latency = Duration::from_millis(latency_ms);

        Ok(Self {
            api,
            storage,
            auth,
            mock_latency,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            storage: StorageConfig {
                zone: CalendarZone::utc(),
                ..StorageConfig::default()
            },
            auth: AuthConfig::default(),
            mock_latency: Duration::ZERO,
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("MOTORBAY_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid MOTORBAY_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("MOTORBAY_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = Self::load_parsed_env("MOTORBAY_API_PORT", 8080u16)?;

        Ok(ApiConfig { host, port })
    }

    fn load_storage_config() -> DaemonResult<StorageConfig> {
        let defaults = StorageConfig::default();

        let data_dir = env::var("MOTORBAY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let key = env::var("MOTORBAY_STORAGE_KEY").unwrap_or(defaults.key);

        let seed = match env::var("MOTORBAY_SEED") {
            Ok(val) => match val.to_lowercase().as_str() {
                "fixtures" => SeedKind::Fixtures,
                "empty" => SeedKind::Empty,
                other => {
                    return Err(DaemonError::Config(format!(
                        "Invalid MOTORBAY_SEED: {}. Expected: fixtures, empty",
                        other
                    )))
                },
            },
            Err(_) => defaults.seed,
        };

        let zone = match env::var("MOTORBAY_CALENDAR_ZONE") {
            Ok(val) => CalendarZone::parse(&val).map_err(|e| {
                DaemonError::Config(format!("Invalid MOTORBAY_CALENDAR_ZONE: {}", e))
            })?,
            Err(_) => defaults.zone,
        };

        let mode = match env::var("MOTORBAY_PERSISTENCE_MODE") {
            Ok(val) => val.parse::<PersistenceMode>().map_err(|e| {
                DaemonError::Config(format!("Invalid MOTORBAY_PERSISTENCE_MODE: {}", e))
            })?,
            Err(_) => defaults.mode,
        };

        Ok(StorageConfig {
            data_dir,
            key,
            seed,
            zone,
            mode,
        })
    }

    fn load_auth_config() -> AuthConfig {
        let defaults = AuthConfig::default();
        AuthConfig {
            email: env::var("MOTORBAY_LOGIN_EMAIL").unwrap_or(defaults.email),
            password: env::var("MOTORBAY_LOGIN_PASSWORD").unwrap_or(defaults.password),
        }
    }

    fn load_parsed_env<T: std::str::FromStr>(key: &str, default: T) -> DaemonResult<T> {
        match env::var(key) {
            Ok(val) => val
                .trim()
                .parse::<T>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            mock_latency: Duration::ZERO,
            environment: Environment::Development,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            key: PersistenceAdapter::DEFAULT_KEY.to_string(),
            seed: SeedKind::Fixtures,
            zone: CalendarZone::Local,
            mode: PersistenceMode::BestEffort,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email: "test@naver.com".to_string(),
            password: "test".to_string(),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.mock_latency, Duration::ZERO);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.api.port, 0);
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.storage.zone, CalendarZone::utc());
    }

    #[test]
    fn test_storage_config_defaults() {
        let storage = StorageConfig::default();

        assert_eq!(storage.data_dir, PathBuf::from("./data"));
        assert_eq!(storage.key, "motorbay-reservations");
        assert_eq!(storage.seed, SeedKind::Fixtures);
        assert_eq!(storage.zone, CalendarZone::Local);
        assert_eq!(storage.mode, PersistenceMode::BestEffort);
    }

    #[test]
    fn test_auth_defaults() {
        let auth = AuthConfig::default();
        assert_eq!(auth.email, "test@naver.com");
        assert_eq!(auth.password, "test");
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
