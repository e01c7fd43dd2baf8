use std::{collections::HashMap, env, net::SocketAddr, path::PathBuf};

use tracing::Level;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:words.db";
pub const DEFAULT_SEED_PATH: &str = "words.json";

/// Webhook endpoint used instead of long polling when both halves are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub database_url: String,
    pub seed_path: PathBuf,
    pub log_level: Level,
    pub webhook: Option<Webhook>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let token = vars
            .get("TELOXIDE_TOKEN")
            .cloned()
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let database_url = vars
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let seed_path = vars
            .get("SEED_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_PATH));

        let log_level = match vars.get("LOG_LEVEL") {
            Some(level) => level.parse().map_err(|_| ConfigError::Invalid {
                name: "LOG_LEVEL",
                reason: format!("unknown level '{level}'"),
            })?,
            None => Level::ERROR,
        };

        let webhook = match (vars.get("NGROK_URL"), vars.get("NGROK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: url.parse().map_err(|e: url::ParseError| ConfigError::Invalid {
                    name: "NGROK_URL",
                    reason: e.to_string(),
                })?,
                addr: addr
                    .parse()
                    .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                        name: "NGROK_ADDR",
                        reason: e.to_string(),
                    })?,
            }),
            _ => None,
        };

        Ok(Self {
            token,
            database_url,
            seed_path,
            log_level,
            webhook,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_vars(&vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELOXIDE_TOKEN")));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_vars(&vars(&[("TELOXIDE_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.seed_path, PathBuf::from(DEFAULT_SEED_PATH));
        assert_eq!(config.log_level, Level::ERROR);
        assert!(config.webhook.is_none());
    }

    #[test]
    fn webhook_needs_both_halves() {
        let config = Config::from_vars(&vars(&[
            ("TELOXIDE_TOKEN", "123:abc"),
            ("NGROK_URL", "https://example.org/bot"),
        ]))
        .unwrap();
        assert!(config.webhook.is_none());

        let config = Config::from_vars(&vars(&[
            ("TELOXIDE_TOKEN", "123:abc"),
            ("NGROK_URL", "https://example.org/bot"),
            ("NGROK_ADDR", "127.0.0.1:8443"),
        ]))
        .unwrap();
        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.addr.port(), 8443);
        assert_eq!(webhook.url.host_str(), Some("example.org"));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = Config::from_vars(&vars(&[
            ("TELOXIDE_TOKEN", "123:abc"),
            ("LOG_LEVEL", "loud"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LOG_LEVEL", .. }));
    }
}
