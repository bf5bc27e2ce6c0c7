use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://pocketbook.db?mode=rwc";
const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6";
const DEFAULT_TRANSLATE_URL: &str = "https://api.mymemory.translated.net";
const DEFAULT_SPEECH_URL: &str = "https://translate.google.com";

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
    pub storage: BookStorageConfig,
    pub enrichment: EnrichmentConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: BookStorageConfig::from_env()?,
            enrichment: EnrichmentConfig::from_env()?,
        })
    }
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

/// Connection settings for a single book's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
}

/// Every book is configured on its own; unset books fall back to
/// `POCKETBOOK_DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct BookStorageConfig {
    pub candidates: StorageConfig,
    pub rates: StorageConfig,
    pub vocabulary: StorageConfig,
    pub phrases: StorageConfig,
}

impl BookStorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shared =
            env::var("POCKETBOOK_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let max_connections = parse_var("POCKETBOOK_DB_MAX_CONNECTIONS", 5u32)?;

        let book = |key: &str| StorageConfig {
            database_url: env::var(key).unwrap_or_else(|_| shared.clone()),
            max_connections,
        };

        Ok(Self {
            candidates: book("POCKETBOOK_CANDIDATES_DATABASE_URL"),
            rates: book("POCKETBOOK_RATES_DATABASE_URL"),
            vocabulary: book("POCKETBOOK_VOCABULARY_DATABASE_URL"),
            phrases: book("POCKETBOOK_PHRASES_DATABASE_URL"),
        })
    }
}

/// Endpoints and timeouts for the remote enrichment services.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub rates: RatesConfig,
    pub translation: TranslationConfig,
    pub speech: SpeechConfig,
}

impl EnrichmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let rates_timeout = parse_var("POCKETBOOK_RATES_TIMEOUT_MS", 3_000u64)?;
        let remote_timeout = parse_var("POCKETBOOK_ENRICHMENT_TIMEOUT_MS", 15_000u64)?;

        Ok(Self {
            rates: RatesConfig {
                base_url: env::var("POCKETBOOK_RATES_URL")
                    .unwrap_or_else(|_| DEFAULT_RATES_URL.into()),
                timeout: Duration::from_millis(rates_timeout),
            },
            translation: TranslationConfig {
                base_url: env::var("POCKETBOOK_TRANSLATE_URL")
                    .unwrap_or_else(|_| DEFAULT_TRANSLATE_URL.into()),
                contact_email: env::var("POCKETBOOK_TRANSLATE_EMAIL")
                    .ok()
                    .filter(|value| !value.trim().is_empty()),
                timeout: Duration::from_millis(remote_timeout),
            },
            speech: SpeechConfig {
                base_url: env::var("POCKETBOOK_SPEECH_URL")
                    .unwrap_or_else(|_| DEFAULT_SPEECH_URL.into()),
                timeout: Duration::from_millis(remote_timeout),
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct RatesConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub base_url: String,
    pub contact_email: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub base_url: String,
    pub timeout: Duration,
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "POCKETBOOK_DATABASE_URL",
            "POCKETBOOK_CANDIDATES_DATABASE_URL",
            "POCKETBOOK_RATES_DATABASE_URL",
            "POCKETBOOK_VOCABULARY_DATABASE_URL",
            "POCKETBOOK_PHRASES_DATABASE_URL",
            "POCKETBOOK_DB_MAX_CONNECTIONS",
            "POCKETBOOK_RATES_URL",
            "POCKETBOOK_RATES_TIMEOUT_MS",
            "POCKETBOOK_TRANSLATE_URL",
            "POCKETBOOK_TRANSLATE_EMAIL",
            "POCKETBOOK_SPEECH_URL",
            "POCKETBOOK_ENRICHMENT_TIMEOUT_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.storage.vocabulary.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.enrichment.rates.timeout, Duration::from_secs(3));
        assert!(config.enrichment.translation.contact_email.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn per_book_database_overrides_the_shared_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("POCKETBOOK_DATABASE_URL", "sqlite://shared.db");
        env::set_var("POCKETBOOK_RATES_DATABASE_URL", "sqlite://rates.db");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.storage.rates.database_url, "sqlite://rates.db");
        assert_eq!(config.storage.candidates.database_url, "sqlite://shared.db");
        assert_eq!(config.storage.phrases.database_url, "sqlite://shared.db");
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_timeouts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("POCKETBOOK_RATES_TIMEOUT_MS", "soon");
        let err = AppConfig::load().expect_err("timeout must be numeric");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "POCKETBOOK_RATES_TIMEOUT_MS"
            }
        ));
        reset_env();
    }
}
