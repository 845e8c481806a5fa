//! Runtime configuration from the environment (`.env` honoured).

use std::collections::HashMap;
use thiserror::Error;

use crate::images::fetch::{RetrievalPlan, DEFAULT_RELAY_1, DEFAULT_RELAY_2};
use crate::images::PrepareContext;
use crate::print::{PrintSpec, PrintSpecError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid { key: &'static str, expected: &'static str, value: String },

    #[error("Invalid print profile: {0}")]
    Print(#[from] PrintSpecError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub relay_1: String,
    pub relay_2: String,
    pub print: PrintSpec,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            relay_1: DEFAULT_RELAY_1.to_string(),
            relay_2: DEFAULT_RELAY_2.to_string(),
            print: PrintSpec::default(),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    /// Builds from an explicit variable map; unset keys take defaults.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let dpi: Option<u32> = get("OFFERDESK_PRINT_DPI").map(|v| parse("OFFERDESK_PRINT_DPI", "an integer DPI", &v)).transpose()?;
        let quality: Option<u8> = get("OFFERDESK_JPEG_QUALITY")
            .map(|v| parse("OFFERDESK_JPEG_QUALITY", "an integer 1-100", &v))
            .transpose()?;

        let print = match (dpi, quality) {
            (None, None) => defaults.print,
            (dpi, quality) => PrintSpec::from_user(
                dpi.unwrap_or(defaults.print.dpi),
                quality.unwrap_or(defaults.print.jpeg_quality),
            )?,
        };

        Ok(Self {
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            relay_1: get("OFFERDESK_RELAY_1").unwrap_or(defaults.relay_1),
            relay_2: get("OFFERDESK_RELAY_2").unwrap_or(defaults.relay_2),
            print,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }

    pub fn prepare_context(&self) -> PrepareContext {
        PrepareContext {
            plan: RetrievalPlan::with_relays(&self.relay_1, &self.relay_2),
            print: self.print,
            ..PrepareContext::default()
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, expected: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::PrintAuthority;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_vars(HashMap::new()).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.relay_1, DEFAULT_RELAY_1);
        assert_eq!(config.print.authority, PrintAuthority::System);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("GEMINI_API_KEY", "secret"),
            ("OFFERDESK_RELAY_2", "https://relay.local/?u="),
            ("OFFERDESK_JPEG_QUALITY", "70"),
        ]))
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.print.jpeg_quality, 70);
        assert_eq!(config.print.dpi, 96);

        let ctx = config.prepare_context();
        assert!(ctx.plan.strategies[2].url_for("a").starts_with("https://relay.local/?u="));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_vars(vars(&[("OFFERDESK_PRINT_DPI", "lots")])).is_err());
        assert!(matches!(
            Config::from_vars(vars(&[("OFFERDESK_PRINT_DPI", "2000")])),
            Err(ConfigError::Print(PrintSpecError::Dpi(2000)))
        ));
    }
}
