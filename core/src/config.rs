//! Store configuration loaded from the environment.

use std::str::FromStr;

use crate::error::{ConfigError, ServiceError};

/// Default service location when `RECORD_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Which remote failures the store may mask with a local commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Every failure falls back to a local commit.
    #[default]
    Always,
    /// Only connectivity failures (unreachable service, 5xx) fall back.
    /// Rejections such as 4xx statuses reach the caller.
    Connectivity,
}

impl FallbackPolicy {
    pub fn allows(&self, err: &ServiceError) -> bool {
        match self {
            FallbackPolicy::Always => true,
            FallbackPolicy::Connectivity => err.is_connectivity(),
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(FallbackPolicy::Always),
            "connectivity" => Ok(FallbackPolicy::Connectivity),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Configuration for a `RecordStore` and the service it talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the record service, without the version segment.
    pub api_url: String,
    pub fallback: FallbackPolicy,
    /// Start with the demo records instead of an empty collection.
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            fallback: FallbackPolicy::default(),
            seed: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// A `.env` file in the working directory is honoured if present.
    ///
    /// | Env Var           | Default                 |
    /// |-------------------|-------------------------|
    /// | `RECORD_API_URL`  | `http://localhost:8080` |
    /// | `RECORD_FALLBACK` | `always`                |
    /// | `RECORD_SEED`     | `true`                  |
    ///
    /// Unparseable values are reported as errors rather than ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("RECORD_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let fallback = match lookup("RECORD_FALLBACK") {
            Some(raw) => raw.parse()?,
            None => defaults.fallback,
        };

        let seed = match lookup("RECORD_SEED") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidFlag {
                    key: "RECORD_SEED",
                    value: raw.clone(),
                })?,
            None => defaults.seed,
        };

        Ok(Self {
            api_url,
            fallback,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.api_url, "http://localhost:8080");
        assert!(config.seed);
    }

    #[test]
    fn reads_every_variable() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("RECORD_API_URL", "https://api.example.com"),
            ("RECORD_FALLBACK", "Connectivity"),
            ("RECORD_SEED", "false"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.fallback, FallbackPolicy::Connectivity);
        assert!(!config.seed);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err =
            StoreConfig::from_lookup(lookup(&[("RECORD_FALLBACK", "sometimes")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownPolicy("sometimes".into()));
    }

    #[test]
    fn rejects_bad_seed_flag() {
        let err = StoreConfig::from_lookup(lookup(&[("RECORD_SEED", "yes")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFlag { key: "RECORD_SEED", ref value } if value == "yes"
        ));
    }

    #[test]
    fn connectivity_policy_only_masks_outages() {
        let outage = ServiceError::Transport("refused".into());
        let rejected = ServiceError::Status {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert!(FallbackPolicy::Connectivity.allows(&outage));
        assert!(!FallbackPolicy::Connectivity.allows(&rejected));
        assert!(FallbackPolicy::Always.allows(&rejected));
    }
}
