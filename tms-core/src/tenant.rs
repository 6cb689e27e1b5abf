//! Tenant context

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{KeyError, TmsResult};
use crate::keys::CACHE_KEY_SEPARATOR;

/// Sentinel tenant used when a transaction arrives without tenant context.
pub const DEFAULT_TENANT_ID: &str = "DEFAULT";

/// Tenant under which all derived keys and persisted records are namespaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Resolve a tenant from optional request context.
    ///
    /// Absent, empty or whitespace-only values resolve to [`DEFAULT_TENANT_ID`].
    /// A tenant containing the cache key separator is rejected, since
    /// `acme:eu` + `e2e-1` and `acme` + `eu:e2e-1` would share a cache key.
    pub fn resolve(raw: Option<&str>) -> TmsResult<Self> {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => {
                let tenant = Self(value.to_string());
                tenant.ensure_cache_safe()?;
                Ok(tenant)
            }
            _ => Ok(Self::default_tenant()),
        }
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn default_tenant() -> Self {
        Self(DEFAULT_TENANT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT_ID
    }

    /// Fail with `KeyError::InvalidTenant` if this tenant cannot prefix a
    /// cache key unambiguously.
    pub fn ensure_cache_safe(&self) -> TmsResult<()> {
        if self.0.contains(CACHE_KEY_SEPARATOR) {
            return Err(KeyError::InvalidTenant {
                tenant_id: self.0.clone(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::default_tenant()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::TmsError;

    #[test]
    fn test_resolve_absent_is_default() -> TmsResult<()> {
        assert_eq!(TenantId::resolve(None)?.as_str(), "DEFAULT");
        assert_eq!(TenantId::resolve(Some(""))?.as_str(), "DEFAULT");
        assert_eq!(TenantId::resolve(Some("   "))?.as_str(), "DEFAULT");
        assert!(TenantId::resolve(None)?.is_default());
        Ok(())
    }

    #[test]
    fn test_resolve_trims_value() -> TmsResult<()> {
        let tenant = TenantId::resolve(Some(" tenant999 "))?;
        assert_eq!(tenant.as_str(), "tenant999");
        assert!(!tenant.is_default());
        Ok(())
    }

    #[test]
    fn test_resolve_rejects_separator() {
        assert!(matches!(
            TenantId::resolve(Some("acme:eu")),
            Err(TmsError::Key(KeyError::InvalidTenant { tenant_id })) if tenant_id == "acme:eu"
        ));
        assert!(TenantId::new("a:b").ensure_cache_safe().is_err());
        assert!(TenantId::new("acme-eu").ensure_cache_safe().is_ok());
    }

    #[test]
    fn test_serializes_as_plain_string() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&TenantId::new("tenant1"))?;
        assert_eq!(json, "\"tenant1\"");
        Ok(())
    }
}
