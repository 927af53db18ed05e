use std::{collections::HashMap, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use redis::{
    Client as RedisClient, RedisResult,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
    pub password_iterations: u32,
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEFAULT_JWT_SECRET
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub uri: SecretString,
}

impl RedisConfig {
    /// Establishes a new Redis connection based on the provided URI.
    ///
    /// - To enable TLS, the URI must use the `rediss://` scheme.
    /// - To enable insecure TLS, the URI must use the `rediss://` scheme and end with `/#insecure`.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn start(&self) -> RedisResult<ConnectionManager> {
        let client = RedisClient::open(self.uri.expose_secret())?;
        let config = ConnectionManagerConfig::new().set_connection_timeout(Duration::from_secs(60));
        client.get_connection_manager_with_config(config).await
    }
}

/// Initial data created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub enabled: bool,
    pub admin_email: String,
    pub admin_password: SecretString,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 5002)?
            .set_default(
                "server.allowed_origins",
                vec!["http://localhost:5173", "http://localhost:3000"],
            )?
            .set_default("auth.jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("auth.password_iterations", 100_000)?
            .set_default("seed.enabled", false)?
            .set_default("seed.admin_email", "admin@barangay.gov.ph")?
            .set_default("seed.admin_password", "admin123")?
            .add_source(File::with_name("config/settings").required(false));

        // Explicit overrides replace the process environment so tests do not
        // see each other's variables
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // e.g. APP_SERVER__PORT or APP_SERVER__ALLOWED_ORIGINS=a,b
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::load_with_sources(Some(HashMap::new())).expect("Failed to load config");

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 5002);
        assert_eq!(
            config.server.allowed_origins,
            ["http://localhost:5173", "http://localhost:3000"]
        );
        assert!(config.auth.uses_default_secret());
        assert_eq!(config.auth.token_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.auth.password_iterations, 100_000);
        assert!(config.redis.is_none());
        assert!(!config.seed.enabled);
        assert_eq!(config.seed.admin_email, "admin@barangay.gov.ph");
    }

    #[test]
    fn test_env_config() {
        let mut env_vars = HashMap::new();
        env_vars.insert("server.host".to_string(), "0.0.0.0".to_string());
        env_vars.insert("server.port".to_string(), "443".to_string());
        env_vars.insert(
            "redis.uri".to_string(),
            "rediss://localhost:6379".to_string(),
        );
        env_vars.insert("auth.jwt_secret".to_string(), "s3cr3t".to_string());
        env_vars.insert("seed.enabled".to_string(), "true".to_string());

        let config = Config::load_with_sources(Some(env_vars)).expect("Failed to load config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 443);
        assert_eq!(
            config.redis.unwrap().uri.expose_secret(),
            "rediss://localhost:6379"
        );
        assert!(!config.auth.uses_default_secret());
        assert!(config.seed.enabled);
    }

    #[test]
    fn test_partial_env_override() {
        let mut env_vars = HashMap::new();
        env_vars.insert("auth.token_ttl_hours".to_string(), "2".to_string());

        let config = Config::load_with_sources(Some(env_vars)).expect("Failed to load config");

        assert_eq!(config.auth.token_ttl(), chrono::Duration::hours(2));
        // The other values should use default
        assert_eq!(config.server.port, 5002);
        assert!(config.redis.is_none());
    }
}
