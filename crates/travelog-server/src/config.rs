use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Secrets that MUST NOT be used to sign tokens.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "secret", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ACCESS_TOKEN_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub token_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub public_url: String,
    pub uploads_dir: PathBuf,
    pub assets_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let token_secret = lookup("ACCESS_TOKEN_SECRET").unwrap_or_default();
        if token_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&token_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let raw_port = var("PORT", "8000");
        let port: u16 = raw_port.parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: raw_port.clone(),
        })?;

        let raw_env = var("TRAVELOG_ENV", "production");
        let environment = raw_env.parse().map_err(|_| ConfigError::Invalid {
            name: "TRAVELOG_ENV",
            value: raw_env.clone(),
        })?;

        Ok(Self {
            db_path: var("TRAVELOG_DB_PATH", "travelog.db").into(),
            token_secret,
            host: var("TRAVELOG_HOST", "0.0.0.0"),
            port,
            environment,
            public_url: var("TRAVELOG_PUBLIC_URL", &format!("http://localhost:{}", port)),
            uploads_dir: var("TRAVELOG_UPLOADS_DIR", "./uploads").into(),
            assets_dir: var("TRAVELOG_ASSETS_DIR", "./assets").into(),
        })
    }
}
