use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::terms::{Term, TermError};
use crate::votes::{RetryPolicy, VotePolicy};

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
    pub engine: EngineConfig,
    pub data_dir: Option<PathBuf>,
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

        let current_term = env::var("APP_CURRENT_TERM")
            .unwrap_or_else(|_| DEFAULT_TERM.to_string())
            .parse::<Term>()
            .map_err(|source| ConfigError::InvalidTerm { source })?;

        let page_size: usize = parse_var("APP_PAGE_SIZE", 20)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                var: "APP_PAGE_SIZE",
            });
        }

        let max_magnitude: i32 = parse_var("APP_VOTE_MAX_MAGNITUDE", 1)?;
        if max_magnitude <= 0 {
            return Err(ConfigError::InvalidNumber {
                var: "APP_VOTE_MAX_MAGNITUDE",
            });
        }

        let retry = RetryPolicy {
            max_attempts: parse_var("APP_VOTE_MAX_ATTEMPTS", 4usize)?.max(1),
            base_backoff_ms: parse_var("APP_VOTE_BACKOFF_MS", 5)?,
        };

        let data_dir = env::var("APP_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                current_term,
                page_size,
                votes: VotePolicy { max_magnitude },
                retry,
            },
            data_dir,
        })
    }
}

const DEFAULT_TERM: &str = "16W";

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
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

/// Vote validation, contention handling, and list defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub current_term: Term,
    pub page_size: usize,
    pub votes: VotePolicy,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            current_term: Term::new(2016, crate::terms::Season::Winter),
            page_size: 20,
            votes: VotePolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTerm { source: TermError },
    InvalidNumber { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTerm { source } => {
                write!(f, "APP_CURRENT_TERM must look like 16W: {source}")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidTerm { source } => Some(source),
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
        for var in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_CURRENT_TERM",
            "APP_PAGE_SIZE",
            "APP_VOTE_MAX_MAGNITUDE",
            "APP_VOTE_MAX_ATTEMPTS",
            "APP_VOTE_BACKOFF_MS",
            "APP_DATA_DIR",
        ] {
            env::remove_var(var);
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
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn engine_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CURRENT_TERM", "17s");
        env::set_var("APP_PAGE_SIZE", "10");
        env::set_var("APP_VOTE_MAX_MAGNITUDE", "3");
        env::set_var("APP_VOTE_MAX_ATTEMPTS", "7");
        env::set_var("APP_DATA_DIR", "/srv/layups");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.current_term.to_string(), "17S");
        assert_eq!(config.engine.page_size, 10);
        assert_eq!(config.engine.votes.max_magnitude, 3);
        assert_eq!(config.engine.retry.max_attempts, 7);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/layups")));
        reset_env();
    }

    #[test]
    fn rejects_invalid_engine_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CURRENT_TERM", "spring");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTerm { .. })
        ));

        reset_env();
        env::set_var("APP_PAGE_SIZE", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                var: "APP_PAGE_SIZE"
            })
        ));
        reset_env();
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
}
