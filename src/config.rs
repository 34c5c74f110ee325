//! # Connection configuration
//!
//! The administrative connection string is read from the environment, after
//! loading a `.env` file if one exists:
//! - `DATABASE_URL` or `MONGODB_URL`: MongoDB connection string with credentials
//!   allowed to create users and indexes
//! - `BOOTSTRAP_APP_NAME`: application name reported to the server (optional)

use std::env;

use crate::errors::ConfigError;

pub const DEFAULT_APP_NAME: &str = "reps-bootstrap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub app_name: String,
}

impl DatabaseConfig {
    /// Load from `.env` and the process environment. `url_override` wins over both.
    pub fn load(url_override: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(url_override, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(url_override: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match url_override {
            Some(url) => url.to_string(),
            None => lookup("DATABASE_URL")
                .or_else(|| lookup("MONGODB_URL"))
                .ok_or(ConfigError::MissingUrl)?,
        };

        if url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let app_name = lookup("BOOTSTRAP_APP_NAME")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        Ok(Self { url, app_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn database_url_takes_precedence() {
        let conf = DatabaseConfig::from_lookup(
            None,
            lookup(&[
                ("DATABASE_URL", "mongodb://primary:27017"),
                ("MONGODB_URL", "mongodb://fallback:27017"),
            ]),
        )
        .unwrap();
        assert_eq!(conf.url, "mongodb://primary:27017");
        assert_eq!(conf.app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn mongodb_url_is_the_fallback() {
        let conf =
            DatabaseConfig::from_lookup(None, lookup(&[("MONGODB_URL", "mongodb://fallback")]))
                .unwrap();
        assert_eq!(conf.url, "mongodb://fallback");
    }

    #[test]
    fn override_beats_environment() {
        let conf = DatabaseConfig::from_lookup(
            Some("mongodb://cli:27017"),
            lookup(&[
                ("DATABASE_URL", "mongodb://env:27017"),
                ("BOOTSTRAP_APP_NAME", "provisioner"),
            ]),
        )
        .unwrap();
        assert_eq!(conf.url, "mongodb://cli:27017");
        assert_eq!(conf.app_name, "provisioner");
    }

    #[test]
    fn missing_and_empty_urls_are_errors() {
        assert!(matches!(
            DatabaseConfig::from_lookup(None, lookup(&[])),
            Err(ConfigError::MissingUrl)
        ));
        assert!(matches!(
            DatabaseConfig::from_lookup(None, lookup(&[("DATABASE_URL", "  ")])),
            Err(ConfigError::EmptyUrl)
        ));
    }
}
