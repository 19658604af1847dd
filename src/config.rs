//! # Configuration Module
//!
//! Router-wide settings that are only meaningful on the root router.
//!
//! ## Environment Variables
//!
//! ### `REGEXMUX_TRAILING_SLASHES`
//!
//! Trailing-slash policy applied after a route matched:
//!
//! - `ignore` (default): never redirect
//! - `append`: redirect `/users` to `/users/`
//! - `remove`: redirect `/users/` to `/users`
//! - `strict`: redirect so the request agrees with the registered pattern
//!
//! Redirects use `301` for `GET` and `308` for every other method. The root
//! path `/` is never redirected.
//!
//! ## Usage
//!
//! ```rust
//! use regexmux::config::{RouterConfig, TrailingSlashPolicy};
//!
//! let config = RouterConfig::from_yaml_str("trailing_slashes: strict").unwrap();
//! assert_eq!(config.trailing_slashes, TrailingSlashPolicy::Strict);
//! ```

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RouterError;

/// Environment variable read by [`RouterConfig::from_env`].
pub const TRAILING_SLASHES_ENV: &str = "REGEXMUX_TRAILING_SLASHES";

/// What to do when the request path and the matched route disagree about a
/// trailing slash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlashPolicy {
    /// Never redirect.
    #[default]
    Ignore,
    /// Redirect to the path with a trailing slash appended.
    Append,
    /// Redirect to the path with its trailing slash removed.
    Remove,
    /// Redirect so that the path ends with `/` exactly when the pattern did.
    Strict,
}

impl FromStr for TrailingSlashPolicy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "append" => Ok(Self::Append),
            "remove" => Ok(Self::Remove),
            "strict" => Ok(Self::Strict),
            other => Err(RouterError::InvalidConfig {
                message: format!("unknown trailing slash policy {other:?}"),
            }),
        }
    }
}

/// Root-level router configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Trailing-slash policy (default: ignore)
    pub trailing_slashes: TrailingSlashPolicy,
}

impl RouterConfig {
    /// Load configuration from environment variables.
    ///
    /// Unknown values fall back to the default with a warning rather than
    /// failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        let trailing_slashes = match env::var(TRAILING_SLASHES_ENV) {
            Ok(val) => val.parse().unwrap_or_else(|err: RouterError| {
                warn!(
                    variable = TRAILING_SLASHES_ENV,
                    value = %val,
                    error = %err,
                    "Ignoring invalid trailing slash policy"
                );
                TrailingSlashPolicy::default()
            }),
            Err(_) => TrailingSlashPolicy::default(),
        };
        RouterConfig { trailing_slashes }
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, RouterError> {
        serde_yaml::from_str(source).map_err(|e| RouterError::InvalidConfig {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("append".parse::<TrailingSlashPolicy>().unwrap(), TrailingSlashPolicy::Append);
        assert_eq!(" Strict ".parse::<TrailingSlashPolicy>().unwrap(), TrailingSlashPolicy::Strict);
        assert!("sometimes".parse::<TrailingSlashPolicy>().is_err());
    }

    #[test]
    fn test_yaml() {
        let config = RouterConfig::from_yaml_str("trailing_slashes: remove").unwrap();
        assert_eq!(config.trailing_slashes, TrailingSlashPolicy::Remove);

        let config = RouterConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());

        assert!(RouterConfig::from_yaml_str("trailing_slashes: maybe").is_err());
    }

    #[test]
    fn test_from_env_with_defaults() {
        env::remove_var(TRAILING_SLASHES_ENV);
        assert_eq!(RouterConfig::from_env(), RouterConfig::default());
    }
}
