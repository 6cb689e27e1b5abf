//! Pseudonym key derivation
//!
//! Entity and account keys are bare concatenations (`tenant ++ id ++ scheme
//! [++ member]`). The format is not delimiter-safe but must stay as-is: keys
//! already persisted in the graph store were produced this way.
//!
//! Cache keys use a colon separator and can be split back into their tenant.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::error::{ConfigError, KeyError, TmsResult};
use crate::message::PartyRefs;

/// Separator between the tenant id and the original key in cache keys.
pub const CACHE_KEY_SEPARATOR: char = ':';

/// Tenant-scoped key for a debtor party.
pub fn generate_debtor_entity_key(tenant_id: &str, id: &str, scheme_prtry: &str) -> String {
    format!("{tenant_id}{id}{scheme_prtry}")
}

/// Tenant-scoped key for a creditor party.
pub fn generate_creditor_entity_key(tenant_id: &str, id: &str, scheme_prtry: &str) -> String {
    format!("{tenant_id}{id}{scheme_prtry}")
}

/// Tenant-scoped key for a debtor account held at `member_id`.
pub fn generate_debtor_account_key(
    tenant_id: &str,
    id: &str,
    scheme_prtry: &str,
    member_id: &str,
) -> String {
    format!("{tenant_id}{id}{scheme_prtry}{member_id}")
}

/// Tenant-scoped key for a creditor account held at `member_id`.
pub fn generate_creditor_account_key(
    tenant_id: &str,
    id: &str,
    scheme_prtry: &str,
    member_id: &str,
) -> String {
    format!("{tenant_id}{id}{scheme_prtry}{member_id}")
}

/// Cache key `tenant:original`.
pub fn generate_tenant_cache_key(tenant_id: &str, original_key: &str) -> String {
    format!("{tenant_id}{CACHE_KEY_SEPARATOR}{original_key}")
}

/// Recover the tenant id from a cache key by splitting on the first colon.
pub fn extract_tenant_from_key(key: &str) -> TmsResult<&str> {
    key.split_once(CACHE_KEY_SEPARATOR)
        .map(|(tenant, _)| tenant)
        .ok_or_else(|| {
            KeyError::InvalidFormat {
                key: key.to_string(),
            }
            .into()
        })
}

/// Legacy tenant-independent debtor account pseudonym.
///
/// SHA-256 over `member ++ id ++ scheme`, hex encoded. Graph nodes keyed this
/// way are shared across tenants.
pub fn hash_debtor_account(member_id: &str, id: &str, scheme_prtry: &str) -> String {
    sha256_hex(&[member_id, id, scheme_prtry])
}

/// Legacy tenant-independent creditor account pseudonym.
pub fn hash_creditor_account(member_id: &str, id: &str, scheme_prtry: &str) -> String {
    sha256_hex(&[member_id, id, scheme_prtry])
}

fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

// ============================================================================
// KEY MODE
// ============================================================================

/// How account keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// `tenant ++ id ++ scheme ++ member`
    #[default]
    Tenant,
    /// Tenant-independent SHA-256 digest of `member ++ id ++ scheme`.
    Legacy,
}

impl FromStr for KeyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" => Ok(KeyMode::Tenant),
            "legacy" => Ok(KeyMode::Legacy),
            other => Err(ConfigError::InvalidValue {
                field: "key_mode".to_string(),
                value: other.to_string(),
                reason: "expected 'tenant' or 'legacy'".to_string(),
            }),
        }
    }
}

// ============================================================================
// PARTY KEYS
// ============================================================================

/// The four pseudonym keys for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyKeys {
    pub debtor_entity: String,
    pub creditor_entity: String,
    pub debtor_account: String,
    pub creditor_account: String,
}

impl PartyKeys {
    /// Derive all keys for the parties of a message.
    ///
    /// Direct derivation and cache rebuild both go through here, so a rebuilt
    /// `DataCache` always carries the same keys as one built directly.
    pub fn derive(tenant_id: &str, parties: &PartyRefs<'_>, mode: KeyMode) -> Self {
        let (debtor_account, creditor_account) = match mode {
            KeyMode::Tenant => (
                generate_debtor_account_key(
                    tenant_id,
                    parties.debtor_account.id,
                    parties.debtor_account.scheme,
                    parties.debtor_member,
                ),
                generate_creditor_account_key(
                    tenant_id,
                    parties.creditor_account.id,
                    parties.creditor_account.scheme,
                    parties.creditor_member,
                ),
            ),
            KeyMode::Legacy => (
                hash_debtor_account(
                    parties.debtor_member,
                    parties.debtor_account.id,
                    parties.debtor_account.scheme,
                ),
                hash_creditor_account(
                    parties.creditor_member,
                    parties.creditor_account.id,
                    parties.creditor_account.scheme,
                ),
            ),
        };

        Self {
            debtor_entity: generate_debtor_entity_key(
                tenant_id,
                parties.debtor.id,
                parties.debtor.scheme,
            ),
            creditor_entity: generate_creditor_entity_key(
                tenant_id,
                parties.creditor.id,
                parties.creditor.scheme,
            ),
            debtor_account,
            creditor_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OtherIdRef;

    #[test]
    fn test_entity_key_is_plain_concatenation() {
        assert_eq!(
            generate_debtor_entity_key("tenant999", "+07-197368463", "MSISDN"),
            "tenant999+07-197368463MSISDN"
        );
        assert_eq!(
            generate_creditor_entity_key("tenant999", "+01-710694778", "MSISDN"),
            "tenant999+01-710694778MSISDN"
        );
    }

    #[test]
    fn test_account_key_appends_member() {
        assert_eq!(
            generate_debtor_account_key("t1", "1010101010", "Mxx", "fsp001"),
            "t11010101010Mxxfsp001"
        );
        assert_eq!(
            generate_creditor_account_key("t1", "2020202020", "Mxx", "fsp002"),
            "t12020202020Mxxfsp002"
        );
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(generate_tenant_cache_key("tenant1", "e2e-1"), "tenant1:e2e-1");
    }

    #[test]
    fn test_extract_tenant_splits_on_first_colon() -> TmsResult<()> {
        assert_eq!(extract_tenant_from_key("tenant1:abc:def")?, "tenant1");
        Ok(())
    }

    #[test]
    fn test_extract_tenant_without_colon_fails() {
        let result = extract_tenant_from_key("invalid-key-without-colon");
        assert!(matches!(
            result,
            Err(crate::TmsError::Key(KeyError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_legacy_hash_is_tenant_independent_sha256() {
        let hash = hash_debtor_account("fsp001", "1010101010", "Mxx");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_creditor_account("fsp001", "1010101010", "Mxx"));

        let mut hasher = Sha256::new();
        hasher.update(b"fsp0011010101010Mxx");
        assert_eq!(hash, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_key_mode_parse() {
        assert_eq!("tenant".parse::<KeyMode>(), Ok(KeyMode::Tenant));
        assert_eq!("LEGACY".parse::<KeyMode>(), Ok(KeyMode::Legacy));
        assert!("hashed".parse::<KeyMode>().is_err());
    }

    fn parties() -> PartyRefs<'static> {
        PartyRefs {
            debtor: OtherIdRef { id: "+07-197368463", scheme: "MSISDN" },
            creditor: OtherIdRef { id: "+01-710694778", scheme: "MSISDN" },
            debtor_account: OtherIdRef { id: "1010101010", scheme: "Mxx" },
            creditor_account: OtherIdRef { id: "2020202020", scheme: "Mxx" },
            debtor_member: "fsp001",
            creditor_member: "fsp002",
        }
    }

    #[test]
    fn test_party_keys_tenant_mode() {
        let keys = PartyKeys::derive("tenant999", &parties(), KeyMode::Tenant);
        assert_eq!(keys.debtor_entity, "tenant999+07-197368463MSISDN");
        assert_eq!(keys.creditor_entity, "tenant999+01-710694778MSISDN");
        assert_eq!(keys.debtor_account, "tenant9991010101010Mxxfsp001");
        assert_eq!(keys.creditor_account, "tenant9992020202020Mxxfsp002");
    }

    #[test]
    fn test_party_keys_legacy_mode_accounts_ignore_tenant() {
        let a = PartyKeys::derive("tenantA", &parties(), KeyMode::Legacy);
        let b = PartyKeys::derive("tenantB", &parties(), KeyMode::Legacy);
        assert_eq!(a.debtor_account, b.debtor_account);
        assert_eq!(a.creditor_account, b.creditor_account);
        assert_ne!(a.debtor_entity, b.debtor_entity);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn ident() -> impl Strategy<Value = String> {
        "[A-Za-z0-9+-]{1,24}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Equal inputs produce equal keys.
        #[test]
        fn prop_entity_keys_deterministic(
            tenant in ident(),
            id in ident(),
            scheme in ident(),
        ) {
            prop_assert_eq!(
                generate_debtor_entity_key(&tenant, &id, &scheme),
                generate_debtor_entity_key(&tenant, &id, &scheme)
            );
            prop_assert_eq!(
                generate_creditor_entity_key(&tenant, &id, &scheme),
                generate_creditor_entity_key(&tenant, &id, &scheme)
            );
        }

        /// Holding raw inputs fixed, a different tenant gives a different key.
        #[test]
        fn prop_entity_keys_differ_by_tenant(
            tenant_a in ident(),
            tenant_b in ident(),
            id in ident(),
            scheme in ident(),
        ) {
            prop_assume!(tenant_a != tenant_b);
            prop_assert_ne!(
                generate_debtor_entity_key(&tenant_a, &id, &scheme),
                generate_debtor_entity_key(&tenant_b, &id, &scheme)
            );
            prop_assert_ne!(
                generate_creditor_entity_key(&tenant_a, &id, &scheme),
                generate_creditor_entity_key(&tenant_b, &id, &scheme)
            );
        }

        /// extract_tenant_from_key inverts generate_tenant_cache_key.
        #[test]
        fn prop_cache_key_roundtrip(
            tenant in "[A-Za-z0-9_-]{1,24}",
            key in "[A-Za-z0-9:_-]{1,48}",
        ) {
            let cache_key = generate_tenant_cache_key(&tenant, &key);
            prop_assert_eq!(extract_tenant_from_key(&cache_key).ok(), Some(tenant.as_str()));
        }
    }
}
