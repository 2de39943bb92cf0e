//! Runtime configuration read from the process environment.

use std::{path::PathBuf, time::Duration};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://move_canvas.db?mode=rwc";
const DEFAULT_JWT_TTL_HOURS: i64 = 24;
const DEFAULT_CONTRACTS_DIR: &str = "./contracts";
const DEFAULT_PUBLISH_COMMAND: &str = "aptos move publish --package-dir";
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings for writing generated sources and invoking the publish CLI
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub contracts_dir: PathBuf,
    /// Program and leading arguments; the source path is appended last.
    pub publish_command: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            contracts_dir: PathBuf::from(DEFAULT_CONTRACTS_DIR),
            publish_command: DEFAULT_PUBLISH_COMMAND
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            timeout: None,
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub jwt_ttl: chrono::Duration,
    pub deploy: DeployConfig,
    pub cors_origins: Vec<String>,
    pub frontend_dist: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = match get("PORT") {
            Some(v) => parse("PORT", &v)?,
            None => DEFAULT_PORT,
        };

        let jwt_ttl_hours: i64 = match get("JWT_TTL_HOURS") {
            Some(v) => parse("JWT_TTL_HOURS", &v)?,
            None => DEFAULT_JWT_TTL_HOURS,
        };
        if jwt_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_HOURS",
                value: jwt_ttl_hours.to_string(),
            });
        }

        let mut deploy = DeployConfig::default();
        if let Some(dir) = get("CONTRACTS_DIR") {
            deploy.contracts_dir = PathBuf::from(dir);
        }
        if let Some(command) = get("PUBLISH_COMMAND") {
            deploy.publish_command = shlex::split(&command)
                .filter(|parts| !parts.is_empty())
                .ok_or(ConfigError::Invalid {
                    key: "PUBLISH_COMMAND",
                    value: command.clone(),
                })?;
        }
        if let Some(secs) = get("DEPLOY_TIMEOUT_SECS") {
            deploy.timeout = Some(Duration::from_secs(parse("DEPLOY_TIMEOUT_SECS", &secs)?));
        }

        let cors_origins = match get("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl: chrono::Duration::hours(jwt_ttl_hours),
            deploy,
            cors_origins,
            frontend_dist: get("FRONTEND_DIST").map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.jwt_secret.expose_secret(), "s3cret");
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(24));
        assert_eq!(
            config.deploy.publish_command,
            vec!["aptos", "move", "publish", "--package-dir"]
        );
        assert!(config.deploy.timeout.is_none());
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.frontend_dist.is_none());
    }

    #[test]
    fn test_missing_secret() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "x"),
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
            ("PUBLISH_COMMAND", "sh -c 'echo \"$0\"'"),
            ("DEPLOY_TIMEOUT_SECS", "30"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.deploy.publish_command, vec!["sh", "-c", "echo \"$0\""]);
        assert_eq!(config.deploy.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("JWT_SECRET", "x"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET", "x"), ("JWT_TTL_HOURS", "0")]),
            Err(ConfigError::Invalid { key: "JWT_TTL_HOURS", .. })
        ));
        assert!(matches!(
            config_from(&[("JWT_SECRET", "x"), ("PUBLISH_COMMAND", "aptos 'unterminated")]),
            Err(ConfigError::Invalid { key: "PUBLISH_COMMAND", .. })
        ));
    }
}
