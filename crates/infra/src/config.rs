//! Store setup configuration (quotation life span, logo shown on printouts).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_CART_LIFE_SPAN_DAYS: &str = "ORDERQUOTE_CART_LIFE_SPAN_DAYS";
pub const ENV_STORE_LOGO_URL: &str = "ORDERQUOTE_STORE_LOGO_URL";

pub const DEFAULT_CART_LIFE_SPAN_DAYS: u32 = 7;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("setup configuration unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    /// Days a quotation stays valid after creation.
    #[serde(default = "default_life_span")]
    pub cart_life_span_days: u32,
    #[serde(default)]
    pub store_logo_url: Option<String>,
}

fn default_life_span() -> u32 {
    DEFAULT_CART_LIFE_SPAN_DAYS
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            cart_life_span_days: DEFAULT_CART_LIFE_SPAN_DAYS,
            store_logo_url: None,
        }
    }
}

impl SetupConfig {
    /// Read from `ORDERQUOTE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CART_LIFE_SPAN_DAYS) {
            match raw.trim().parse::<u32>() {
                Ok(days) => config.cart_life_span_days = days,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "{ENV_CART_LIFE_SPAN_DAYS} is not a number; using default"
                ),
            }
        }

        // "/" is what the admin form stores when no logo was uploaded.
        config.store_logo_url = lookup(ENV_STORE_LOGO_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && url != "/");

        config
    }
}

/// Source of the store's setup configuration.
#[async_trait::async_trait]
pub trait SetupConfigProvider: Send + Sync {
    async fn setup_config(&self) -> Result<SetupConfig, ConfigError>;
}

#[async_trait::async_trait]
impl<P> SetupConfigProvider for Arc<P>
where
    P: SetupConfigProvider + ?Sized,
{
    async fn setup_config(&self) -> Result<SetupConfig, ConfigError> {
        (**self).setup_config().await
    }
}

/// Fixed configuration (e.g. loaded once with [`SetupConfig::from_env`]).
#[derive(Debug, Clone, Default)]
pub struct StaticSetupConfig(pub SetupConfig);

#[async_trait::async_trait]
impl SetupConfigProvider for StaticSetupConfig {
    async fn setup_config(&self) -> Result<SetupConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(SetupConfig::from_lookup(lookup(&[])), SetupConfig::default());
        assert_eq!(SetupConfig::default().cart_life_span_days, 7);
    }

    #[test]
    fn reads_overrides() {
        let config = SetupConfig::from_lookup(lookup(&[
            (ENV_CART_LIFE_SPAN_DAYS, " 30 "),
            (ENV_STORE_LOGO_URL, "https://cdn/logo.png"),
        ]));
        assert_eq!(config.cart_life_span_days, 30);
        assert_eq!(config.store_logo_url.as_deref(), Some("https://cdn/logo.png"));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = SetupConfig::from_lookup(lookup(&[
            (ENV_CART_LIFE_SPAN_DAYS, "a week"),
            (ENV_STORE_LOGO_URL, "/"),
        ]));
        assert_eq!(config, SetupConfig::default());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: SetupConfig = serde_json::from_str(r#"{"storeLogoUrl":"x"}"#).unwrap();
        assert_eq!(config.cart_life_span_days, DEFAULT_CART_LIFE_SPAN_DAYS);
        assert_eq!(config.store_logo_url.as_deref(), Some("x"));
    }
}
