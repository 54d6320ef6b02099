use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated list of origins allowed to call the API with credentials.
    #[serde(default)]
    pub cors_origins: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Startup attempts against a backend that may not be ready yet.
    pub connect_attempts: u32,
    pub connect_backoff_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub access_token_expire_minutes: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

/// Account ensured to exist by the seeding routine.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl ServerConfig {
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.cors_origins", "http://localhost:3000")?
            .set_default("database.url", "sqlite://portal.db")?
            .set_default("database.max_connections", 10)?
            .set_default("database.connect_attempts", 10)?
            .set_default("database.connect_backoff_secs", 2)?
            .set_default("auth.jwt_secret", "change-me")?
            .set_default("auth.jwt_algorithm", "HS256")?
            .set_default("auth.access_token_expire_minutes", 480)?
            .set_default("auth.cookie_name", "portal_access")?
            .set_default("auth.cookie_secure", false)?
            .set_default("admin.email", "admin@portal.local")?
            .set_default("admin.password", "admin123")?
            .set_default("admin.name", "Administrador")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with PORTAL__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("PORTAL").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://portal.db".to_string(),
                max_connections: 10,
                connect_attempts: 10,
                connect_backoff_secs: 2,
            },
            auth: AuthConfig {
                jwt_secret: "change-me".to_string(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 480,
                cookie_name: "portal_access".to_string(),
                cookie_secure: false,
            },
            admin: AdminConfig {
                email: "admin@portal.local".to_string(),
                password: "admin123".to_string(),
                name: "Administrador".to_string(),
            },
        }
    }
}
