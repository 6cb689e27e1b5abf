//! Tenant-scoped DataCache keys.
//!
//! `TenantCacheKey` can only be built from a tenant and a correlation id, or
//! parsed from a string that already carries its tenant, so a cache lookup
//! without a tenant cannot be expressed.

use std::fmt;

use tms_core::{extract_tenant_from_key, generate_tenant_cache_key, TenantId, TmsResult};

/// Cache key `<tenantId>:<correlationId>`.
///
/// Parsing splits at the first `:`, so construction refuses tenants that
/// contain one; correlation ids may contain any character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantCacheKey {
    inner: String,
    tenant_len: usize,
}

impl TenantCacheKey {
    /// Fails with `KeyError::InvalidTenant` for a tenant containing `:`.
    pub fn new(tenant_id: &TenantId, correlation_id: &str) -> TmsResult<Self> {
        tenant_id.ensure_cache_safe()?;
        Ok(Self {
            inner: generate_tenant_cache_key(tenant_id.as_str(), correlation_id),
            tenant_len: tenant_id.as_str().len(),
        })
    }

    /// Parse a stored key, failing with `InvalidFormat` if it has no tenant.
    pub fn parse(key: &str) -> TmsResult<Self> {
        let tenant = extract_tenant_from_key(key)?;
        Ok(Self {
            tenant_len: tenant.len(),
            inner: key.to_string(),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.inner[..self.tenant_len]
    }

    pub fn correlation_id(&self) -> &str {
        &self.inner[self.tenant_len + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for TenantCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
