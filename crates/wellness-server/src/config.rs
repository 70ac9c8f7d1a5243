use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use rand::RngCore;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key-here",
];

/// Five years; login computes `now + ttl`, which must stay representable.
const MAX_TOKEN_TTL_HOURS: i64 = 5 * 365 * 24;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = match env::var("WELLNESS_JWT_SECRET") {
            Ok(secret) if PLACEHOLDER_SECRETS.contains(&secret.trim()) => {
                bail!("WELLNESS_JWT_SECRET is still a placeholder; set a random value");
            }
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("WELLNESS_JWT_SECRET not set; using a per-process secret, sessions end on restart");
                random_secret()
            }
        };

        let token_ttl = token_ttl(try_load("WELLNESS_TOKEN_TTL_HOURS", "168")?)?;

        Ok(Self {
            host: try_load("WELLNESS_HOST", "0.0.0.0")?,
            port: try_load("WELLNESS_PORT", "8001")?,
            db_path: try_load("WELLNESS_DB_PATH", "wellness.db")?,
            jwt_secret,
            token_ttl,
        })
    }

    /// Binds the listener, resolving `host` when it is a name.
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", self.host, self.port))
    }
}

fn token_ttl(hours: i64) -> Result<chrono::Duration> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        bail!("WELLNESS_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {hours}");
    }
    Ok(chrono::Duration::hours(hours))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match raw.parse() {
        Ok(v) => Ok(v),
        Err(e) => bail!("Invalid {key} value '{raw}': {e}"),
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_secrets_differ() {
        let a = random_secret();
        let b = random_secret();
        assert_ne!(a, b);
        assert_eq!(B64.decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn token_ttl_is_bounded() {
        assert_eq!(token_ttl(168).unwrap(), chrono::Duration::hours(168));
        assert!(token_ttl(MAX_TOKEN_TTL_HOURS).is_ok());
        assert!(token_ttl(0).is_err());
        assert!(token_ttl(-1).is_err());
        assert!(token_ttl(MAX_TOKEN_TTL_HOURS + 1).is_err());
        assert!(token_ttl(i64::MAX).is_err());
    }

    #[tokio::test]
    async fn binds_host_names() {
        let config = Config {
            host: "localhost".into(),
            port: 0,
            db_path: PathBuf::from("unused.db"),
            jwt_secret: random_secret(),
            token_ttl: chrono::Duration::hours(1),
        };
        let listener = config.bind().await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn defaults_parse() {
        let port: u16 = try_load("WELLNESS_TEST_UNSET_PORT", "8001").unwrap();
        assert_eq!(port, 8001);
        assert!(try_load::<u16>("WELLNESS_TEST_UNSET_PORT", "not-a-port").is_err());
    }
}
