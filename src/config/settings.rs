//! Process settings from the environment (a `.env` file is honoured).

use crate::error::ConfigError;
use crate::store::DEFAULT_MAX_CONNECTIONS;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_ROUTERS_DIR: &str = "routers";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub routers_dir: PathBuf,
    pub bind_addr: String,
    pub max_connections: u32,
    /// Table names to create; `None` creates every registered model.
    pub models: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            routers_dir: PathBuf::from(DEFAULT_ROUTERS_DIR),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            models: None,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read `DATABASE_URL`, `ROUTERS_DIR`, `BIND_ADDR`,
    /// `DB_MAX_CONNECTIONS` and `DB_MODELS` (comma separated).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Setting {
                key: "DB_MAX_CONNECTIONS",
                message: e.to_string(),
            })?,
            None => defaults.max_connections,
        };
        let models = lookup("DB_MODELS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        });
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            routers_dir: lookup("ROUTERS_DIR").map(PathBuf::from).unwrap_or(defaults.routers_dir),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections,
            models,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Settings::from_lookup(lookup(&[])).unwrap(), Settings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("ROUTERS_DIR", "svc/routers"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_MODELS", "test2, test1,"),
        ]))
        .unwrap();
        assert_eq!(s.database_url, "postgres://localhost/app");
        assert_eq!(s.routers_dir, PathBuf::from("svc/routers"));
        assert_eq!(s.bind_addr, "127.0.0.1:9000");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.models, Some(vec!["test2".to_string(), "test1".to_string()]));
    }

    #[test]
    fn bad_number_is_a_setting_error() {
        let err = Settings::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Setting { key: "DB_MAX_CONNECTIONS", .. }));
    }
}
