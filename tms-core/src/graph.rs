//! Graph node and edge records written before a relationship edge.

use serde::{Deserialize, Serialize};

use crate::keys::PartyKeys;
use crate::relationship::account_node;
use crate::tenant::TenantId;

/// Graph collection holding entity nodes.
pub const ENTITIES_COLLECTION: &str = "entities";

/// A debtor or creditor party node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNode {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "TenantId")]
    pub tenant_id: String,
    #[serde(rename = "CreDtTm")]
    pub cre_dt_tm: String,
}

/// An account node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNode {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "TenantId")]
    pub tenant_id: String,
}

/// Ownership edge `entities/<entity> -> accounts/<account>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHolder {
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
    #[serde(rename = "CreDtTm")]
    pub cre_dt_tm: String,
    #[serde(rename = "TenantId")]
    pub tenant_id: String,
}

/// Insert-if-absent records for both sides of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyGraph {
    pub entities: [EntityNode; 2],
    pub accounts: [AccountNode; 2],
    pub holders: [AccountHolder; 2],
}

impl PartyGraph {
    pub fn new(tenant_id: &TenantId, keys: &PartyKeys, cre_dt_tm: &str) -> Self {
        let tenant = tenant_id.to_string();
        let entity = |key: &str| EntityNode {
            key: key.to_string(),
            tenant_id: tenant.clone(),
            cre_dt_tm: cre_dt_tm.to_string(),
        };
        let account = |key: &str| AccountNode {
            key: key.to_string(),
            tenant_id: tenant.clone(),
        };
        let holder = |entity: &str, account: &str| AccountHolder {
            from: format!("{ENTITIES_COLLECTION}/{entity}"),
            to: account_node(account),
            cre_dt_tm: cre_dt_tm.to_string(),
            tenant_id: tenant.clone(),
        };

        Self {
            entities: [entity(&keys.debtor_entity), entity(&keys.creditor_entity)],
            accounts: [account(&keys.debtor_account), account(&keys.creditor_account)],
            holders: [
                holder(&keys.debtor_entity, &keys.debtor_account),
                holder(&keys.creditor_entity, &keys.creditor_account),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_graph_links_entities_to_accounts() {
        let keys = PartyKeys {
            debtor_entity: "t1dMSISDN".to_string(),
            creditor_entity: "t1cMSISDN".to_string(),
            debtor_account: "t1daMxxfsp001".to_string(),
            creditor_account: "t1caMxxfsp002".to_string(),
        };
        let graph = PartyGraph::new(&TenantId::new("t1"), &keys, "2023-02-03T07:17:52.216Z");

        assert_eq!(graph.entities[0].key, "t1dMSISDN");
        assert_eq!(graph.accounts[1].key, "t1caMxxfsp002");
        assert_eq!(graph.holders[0].from, "entities/t1dMSISDN");
        assert_eq!(graph.holders[0].to, "accounts/t1daMxxfsp001");
        assert_eq!(graph.holders[1].from, "entities/t1cMSISDN");
        assert!(graph.holders.iter().all(|h| h.tenant_id == "t1"));
    }
}
