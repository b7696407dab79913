use std::env;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} is not valid: {value:?}")]
    Malformed { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub superuser: Option<SuperuserConfig>,
}

/// Staff account ensured on start-up.
#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Reads the configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Malformed {
                        name: "TOKEN_TTL_HOURS",
                        value,
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let superuser = match (lookup("SUPERUSER_USERNAME"), lookup("SUPERUSER_PASSWORD")) {
            (Some(username), Some(password)) => Some(SuperuserConfig { username, password }),
            (Some(_), None) => return Err(ConfigError::Missing("SUPERUSER_PASSWORD")),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours,
            superuser,
        })
    }
}
