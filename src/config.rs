use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the PostgreSQL database. Places are kept in memory when unset.
    pub database_url: Option<String>,
    /// The URL of the Redis server. Sessions are kept in memory when unset.
    pub redis_url: Option<String>,
    /// The name of the cookie carrying the session token.
    pub session_cookie_name: String,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            redis_url: None,
            session_cookie_name: "token".to_string(),
            session_duration_days: 30,
            secure_cookies: false,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(addr) => addr
                .parse()
                .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?,
            Err(_) => defaults.bind_addr,
        };

        let session_duration_days: i64 = env::var("SESSION_DURATION_DAYS")
            .unwrap_or_else(|_| defaults.session_duration_days.to_string())
            .parse()
            .context("Invalid SESSION_DURATION_DAYS")?;

        if session_duration_days <= 0 {
            anyhow::bail!("SESSION_DURATION_DAYS must be positive");
        }

        let session_cookie_name = env::var("SESSION_COOKIE_NAME")
            .unwrap_or(defaults.session_cookie_name);

        if session_cookie_name.is_empty()
            || !session_cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("SESSION_COOKIE_NAME must be a non-empty token of [A-Za-z0-9_-]");
        }

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        Ok(Self {
            bind_addr,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            session_cookie_name,
            session_duration_days,
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string())
                == "production",
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_locally_from_memory() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.session_cookie_name, "token");
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert!(!config.secure_cookies);
    }
}
