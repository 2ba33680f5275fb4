use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use courier_api::token::DEFAULT_TOKEN_TTL_MINUTES;

/// JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["secret", "change-me-to-a-random-string", "dev-secret-change-me"];

/// One year.
const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
}

impl Environment {
    /// Unknown values fall back to `Dev`.
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("test") => Self::Test,
            _ => Self::Dev,
        }
    }

    fn default_db_path(self) -> &'static str {
        match self {
            Self::Dev => "courier.db",
            Self::Test => "courier_test.db",
        }
    }
}

/// Raw variables as read from the process environment.
#[derive(Debug, Default)]
pub struct ConfigEnv {
    pub env: Option<String>,
    pub jwt_secret: Option<String>,
    pub db_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub token_ttl_minutes: Option<String>,
}

impl ConfigEnv {
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok();
        Self {
            env: var("COURIER_ENV"),
            jwt_secret: var("COURIER_JWT_SECRET"),
            db_path: var("COURIER_DB_PATH"),
            host: var("COURIER_HOST"),
            port: var("COURIER_PORT"),
            token_ttl_minutes: var("COURIER_TOKEN_TTL_MINUTES"),
        }
    }
}

pub struct Config {
    pub environment: Environment,
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl: chrono::Duration,
}

impl Config {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

pub fn parse_config(env: ConfigEnv) -> Result<Config> {
    let environment = Environment::parse(env.env.as_deref());

    let jwt_secret = env.jwt_secret.unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        bail!("COURIER_JWT_SECRET is unset or still a placeholder");
    }

    let port: u16 = env
        .port
        .as_deref()
        .unwrap_or("3000")
        .parse()
        .context("COURIER_PORT must be a port number")?;

    let ttl_minutes: i64 = match env.token_ttl_minutes.as_deref() {
        Some(raw) => raw
            .parse()
            .context("COURIER_TOKEN_TTL_MINUTES must be an integer")?,
        None => DEFAULT_TOKEN_TTL_MINUTES,
    };
    if ttl_minutes <= 0 {
        bail!("COURIER_TOKEN_TTL_MINUTES must be positive");
    }
    if ttl_minutes > MAX_TOKEN_TTL_MINUTES {
        bail!("COURIER_TOKEN_TTL_MINUTES must be at most {MAX_TOKEN_TTL_MINUTES}");
    }
    let token_ttl = chrono::Duration::try_minutes(ttl_minutes)
        .context("COURIER_TOKEN_TTL_MINUTES out of range")?;

    Ok(Config {
        environment,
        jwt_secret,
        db_path: env
            .db_path
            .unwrap_or_else(|| environment.default_db_path().into())
            .into(),
        host: env.host.unwrap_or_else(|| "0.0.0.0".into()),
        port,
        token_ttl,
    })
}
