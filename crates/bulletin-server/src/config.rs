use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    jwt_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("BULLETIN_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("BULLETIN_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BULLETIN_PORT is not a port number: {}", raw))?,
            None => 3000,
        };
        let db_path = lookup("BULLETIN_DB_PATH")
            .unwrap_or_else(|| "bulletin.db".into())
            .into();
        let jwt_secret = lookup("BULLETIN_JWT_SECRET").filter(|s| !s.is_empty());

        Ok(Self { host, port, db_path, jwt_secret })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().with_context(|| format!("Invalid listen address {}", addr))
    }

    /// Serving needs a real secret; the maintenance commands do not.
    pub fn jwt_secret(&self) -> Result<&str> {
        match self.jwt_secret.as_deref() {
            None => bail!("BULLETIN_JWT_SECRET is unset. Set it in your .env file and restart."),
            Some(s) if PLACEHOLDER_SECRETS.contains(&s) => {
                bail!("BULLETIN_JWT_SECRET is still a placeholder. Set a random value and restart.")
            }
            Some(s) => Ok(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.db_path, PathBuf::from("bulletin.db"));
        assert!(cfg.jwt_secret().is_err());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("BULLETIN_HOST", "127.0.0.1"),
            ("BULLETIN_PORT", "8080"),
            ("BULLETIN_DB_PATH", "/tmp/updates.db"),
            ("BULLETIN_JWT_SECRET", "s3cr3t"),
        ])
        .unwrap();
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/updates.db"));
        assert_eq!(cfg.jwt_secret().unwrap(), "s3cr3t");
    }

    #[test]
    fn rejects_bad_port_and_placeholder_secret() {
        assert!(config(&[("BULLETIN_PORT", "http")]).is_err());

        let cfg = config(&[("BULLETIN_JWT_SECRET", "dev-secret-change-me")]).unwrap();
        assert!(cfg.jwt_secret().is_err());

        let cfg = config(&[("BULLETIN_JWT_SECRET", "")]).unwrap();
        assert!(cfg.jwt_secret().is_err());
    }
}
