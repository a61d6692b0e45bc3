use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderValue;
use chrono::Duration;

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
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
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

        let data_file = non_empty_var("APP_DATA_FILE").map(PathBuf::from);
        let seed_pets = match non_empty_var("APP_SEED_PETS") {
            Some(raw) => parse_flag("APP_SEED_PETS", &raw)?,
            None => false,
        };

        let session_ttl_hours = match non_empty_var("APP_SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::InvalidSessionTtl)?,
            None => 168,
        };

        let bootstrap_admin = match (
            non_empty_var("APP_ADMIN_EMAIL"),
            non_empty_var("APP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                username: non_empty_var("APP_ADMIN_USERNAME")
                    .unwrap_or_else(|| "adminuser".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminBootstrap),
        };

        let cors = match non_empty_var("APP_CORS_ORIGINS") {
            Some(raw) => CorsConfig::parse(&raw)?,
            None => CorsConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                data_file,
                seed_pets,
            },
            auth: AuthConfig {
                session_ttl_hours,
                bootstrap_admin,
            },
            cors,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where documents live and whether the demo catalogue is loaded.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub data_file: Option<PathBuf>,
    pub seed_pets: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: u32,
    pub bootstrap_admin: Option<AdminBootstrap>,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.session_ttl_hours))
    }
}

/// Browser origins allowed to call the API. Empty allows any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<HeaderValue>,
}

impl CorsConfig {
    /// Comma-separated origins; `*` alone allows any origin.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim() == "*" {
            return Ok(Self::default());
        }

        let allowed_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                let valid = origin.starts_with("http://") || origin.starts_with("https://");
                HeaderValue::from_str(origin)
                    .ok()
                    .filter(|_| valid)
                    .ok_or_else(|| ConfigError::InvalidCorsOrigin {
                        value: origin.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { allowed_origins })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

/// Credentials for the administrator account ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { key: &'static str },
    InvalidSessionTtl,
    IncompleteAdminBootstrap,
    InvalidCorsOrigin { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { key } => {
                write!(f, "{key} must be one of true/false/1/0/yes/no/on/off")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "APP_SESSION_TTL_HOURS must be a positive integer")
            }
            ConfigError::IncompleteAdminBootstrap => write!(
                f,
                "APP_ADMIN_EMAIL and APP_ADMIN_PASSWORD must be set together"
            ),
            ConfigError::InvalidCorsOrigin { value } => write!(
                f,
                "APP_CORS_ORIGINS entry '{value}' must be an http(s) origin"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidSessionTtl
            | ConfigError::IncompleteAdminBootstrap
            | ConfigError::InvalidCorsOrigin { .. } => None,
        }
    }
}
