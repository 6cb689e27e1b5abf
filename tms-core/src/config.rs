//! Correlation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, TmsResult};
use crate::keys::KeyMode;

/// Default DataCache lifetime.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Settings shared by direct derivation and cache rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// TTL handed to the cache store for every DataCache write.
    pub cache_ttl_secs: u64,
    pub key_mode: KeyMode,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            key_mode: KeyMode::default(),
        }
    }
}

impl CorrelationConfig {
    /// Read `TMS_CACHE_TTL_SECS` and `TMS_KEY_MODE`.
    ///
    /// Unset variables fall back to defaults; a set but unparsable value is
    /// an error rather than a silent default.
    pub fn from_env() -> TmsResult<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("TMS_CACHE_TTL_SECS") {
            config.cache_ttl_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "cache_ttl_secs".to_string(),
                value: raw.clone(),
                reason: "expected a whole number of seconds".to_string(),
            })?;
        }

        if let Ok(raw) = std::env::var("TMS_KEY_MODE") {
            config.key_mode = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TmsResult<()> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl_secs".to_string(),
                value: self.cache_ttl_secs.to_string(),
                reason: "cache_ttl_secs must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TmsError;

    #[test]
    fn test_defaults_are_valid() {
        let config = CorrelationConfig::default();
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.key_mode, KeyMode::Tenant);
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = CorrelationConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TmsError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
