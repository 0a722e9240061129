//! # Configuration State
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`storefront.toml` in the platform config dir, or `--config`)
//! 3. Environment variables (`STOREFRONT_*`)
//!
//! Read-only after loading, so no mutex.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use storefront_core::{Money, DEFAULT_CURRENCY};

/// Signing secret used when none is configured. Fine for a local demo,
/// flagged at startup.
const DEV_SESSION_SECRET: &str = "storefront-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConfigState {
    /// Shown in page headers
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Database file. `None` means `storefront.db` in the data dir.
    pub database_path: Option<PathBuf>,

    /// HMAC secret for session tokens
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_ttl_secs: i64,

    pub image_host: ImageHostSettings,

    /// Base URL of the PIN code lookup; the code is appended as a path
    /// segment.
    pub postal_endpoint: String,

    /// Page that accepts password reset tokens; `?token=` is appended.
    pub reset_link_base: String,

    /// Notifications kept before the oldest is dropped
    pub notification_capacity: usize,
}

/// Image host credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageHostSettings {
    pub cloud_name: String,
    pub upload_preset: String,
    /// Full upload URL. Overrides the one derived from `cloud_name`.
    pub endpoint: Option<String>,
}

impl ImageHostSettings {
    pub fn upload_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                self.cloud_name
            ),
        }
    }

    pub fn is_configured(&self) -> bool {
        (self.endpoint.is_some() || !self.cloud_name.is_empty()) && !self.upload_preset.is_empty()
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Storefront".to_string(),
            currency_code: DEFAULT_CURRENCY.to_string(),
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            database_path: None,
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_ttl_secs: 7 * 24 * 60 * 60,
            image_host: ImageHostSettings::default(),
            postal_endpoint: "https://api.postalpincode.in/pincode".to_string(),
            reset_link_base: "http://localhost:5173/reset-password".to_string(),
            notification_capacity: 5,
        }
    }
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        if config.session_secret == DEV_SESSION_SECRET {
            warn!("Using the development session secret; set STOREFRONT_SESSION_SECRET");
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `STOREFRONT_*` overrides. Unparseable numbers are ignored
    /// with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("STOREFRONT_STORE_NAME") {
            self.store_name = name;
        }
        if let Some(code) = lookup("STOREFRONT_CURRENCY_CODE") {
            self.currency_code = code;
        }
        if let Some(symbol) = lookup("STOREFRONT_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
        if let Some(decimals) = lookup("STOREFRONT_CURRENCY_DECIMALS") {
            match decimals.parse() {
                Ok(d) => self.currency_decimals = d,
                Err(_) => warn!(value = %decimals, "Ignoring STOREFRONT_CURRENCY_DECIMALS"),
            }
        }
        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(secret) = lookup("STOREFRONT_SESSION_SECRET") {
            self.session_secret = secret;
        }
        if let Some(ttl) = lookup("STOREFRONT_SESSION_TTL_SECS") {
            match ttl.parse() {
                Ok(t) => self.session_ttl_secs = t,
                Err(_) => warn!(value = %ttl, "Ignoring STOREFRONT_SESSION_TTL_SECS"),
            }
        }
        if let Some(cloud) = lookup("STOREFRONT_IMAGE_CLOUD_NAME") {
            self.image_host.cloud_name = cloud;
        }
        if let Some(preset) = lookup("STOREFRONT_IMAGE_UPLOAD_PRESET") {
            self.image_host.upload_preset = preset;
        }
        if let Some(endpoint) = lookup("STOREFRONT_IMAGE_ENDPOINT") {
            self.image_host.endpoint = Some(endpoint);
        }
        if let Some(endpoint) = lookup("STOREFRONT_POSTAL_ENDPOINT") {
            self.postal_endpoint = endpoint;
        }
        if let Some(base) = lookup("STOREFRONT_RESET_LINK_BASE") {
            self.reset_link_base = base;
        }
        if let Some(capacity) = lookup("STOREFRONT_NOTIFICATION_CAPACITY") {
            match capacity.parse() {
                Ok(c) => self.notification_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring STOREFRONT_NOTIFICATION_CAPACITY"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_decimals > 4 {
            return Err(ConfigError::Invalid(
                "currency_decimals must be at most 4".into(),
            ));
        }
        if self.session_secret.is_empty() {
            return Err(ConfigError::Invalid("session_secret must not be empty".into()));
        }
        if self.session_ttl_secs <= 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_secs must be greater than 0".into(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be greater than 0".into(),
            ));
        }
        Url::parse(&self.postal_endpoint)
            .map_err(|e| ConfigError::Invalid(format!("postal_endpoint: {}", e)))?;
        Url::parse(&self.reset_link_base)
            .map_err(|e| ConfigError::Invalid(format!("reset_link_base: {}", e)))?;
        if let Some(endpoint) = &self.image_host.endpoint {
            Url::parse(endpoint)
                .map_err(|e| ConfigError::Invalid(format!("image_host.endpoint: {}", e)))?;
        }
        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "app")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_minor(99_900)), "₹999.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let minor = amount.minor();
        let divisor = 10_i64.pow(u32::from(self.currency_decimals));
        let whole = (minor / divisor).abs();
        let frac = (minor % divisor).abs();
        let sign = if minor < 0 { "-" } else { "" };

        if self.currency_decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.currency_symbol,
                whole,
                frac,
                width = usize::from(self.currency_decimals)
            )
        } else {
            format!("{}{}{}", sign, self.currency_symbol, whole)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_minor(99_900)), "₹999.00");
        assert_eq!(config.format_currency(Money::from_minor(100)), "₹1.00");
        assert_eq!(config.format_currency(Money::from_minor(1)), "₹0.01");
        assert_eq!(config.format_currency(Money::zero()), "₹0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_minor(-1234)), "-₹12.34");
    }

    #[test]
    fn test_format_currency_no_decimals() {
        let config = ConfigState {
            currency_symbol: "¥".to_string(),
            currency_decimals: 0,
            ..ConfigState::default()
        };
        assert_eq!(config.format_currency(Money::from_minor(1500)), "¥1500");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConfigState = toml::from_str(
            r#"
            store_name = "Kurta Corner"

            [image_host]
            cloud_name = "demo"
            upload_preset = "unsigned"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_name, "Kurta Corner");
        assert_eq!(config.currency_code, "INR");
        assert_eq!(
            config.image_host.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert!(config.image_host.is_configured());
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_STORE_NAME", "Env Store"),
            ("STOREFRONT_SESSION_TTL_SECS", "60"),
            ("STOREFRONT_NOTIFICATION_CAPACITY", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigState::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store_name, "Env Store");
        assert_eq!(config.session_ttl_secs, 60);
        assert_eq!(config.notification_capacity, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ConfigState {
            notification_capacity: 0,
            ..ConfigState::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ConfigState {
            postal_endpoint: "not a url".to_string(),
            ..ConfigState::default()
        };
        assert!(config.validate().is_err());

        assert!(ConfigState::default().validate().is_ok());
    }
}
