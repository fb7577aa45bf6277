//! Relay configuration from the environment.

use std::net::SocketAddr;

use easyhybrid_core::secret;

use crate::error::{RelayError, RelayResult};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8788";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

#[derive(Clone)]
pub struct RelayConfig {
    pub addr: SocketAddr,
    /// OAuth app secret; never leaves this process.
    pub client_secret: String,
    pub token_url: String,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("addr", &self.addr)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl RelayConfig {
    /// Reads `GITHUB_CLIENT_SECRET`, `RELAY_ADDR` and `GITHUB_TOKEN_URL`.
    ///
    /// The secret may be an `env::` or `pass::` reference.
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RelayResult<Self> {
        let raw_secret = lookup("GITHUB_CLIENT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(RelayError::MissingSecret)?;
        let client_secret = secret::resolve(&raw_secret)?;

        let addr_str = lookup("RELAY_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_str
            .parse()
            .map_err(|_| RelayError::InvalidAddr(addr_str.clone()))?;

        let token_url = lookup("GITHUB_TOKEN_URL").unwrap_or_else(|| GITHUB_TOKEN_URL.to_string());

        Ok(Self {
            addr,
            client_secret,
            token_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = RelayConfig::from_lookup(lookup(&[("GITHUB_CLIENT_SECRET", "shh")])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.token_url, GITHUB_TOKEN_URL);
        assert_eq!(config.client_secret, "shh");
        assert!(!format!("{:?}", config).contains("shh"));
    }

    #[test]
    fn secret_is_required() {
        let err = RelayConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, RelayError::MissingSecret));
    }

    #[test]
    fn bad_addr_is_rejected() {
        let err = RelayConfig::from_lookup(lookup(&[
            ("GITHUB_CLIENT_SECRET", "shh"),
            ("RELAY_ADDR", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::InvalidAddr(_)));
    }
}
