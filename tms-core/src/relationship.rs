//! Transaction relationship edges
//!
//! One directed edge per inbound message, between two account nodes in the
//! graph store. Edges are append-only.

use serde::{Deserialize, Serialize};

use crate::data_cache::DataCache;
use crate::error::{TmsResult, ValidationError};
use crate::keys::PartyKeys;
use crate::message::{Geolocation, Pacs002, Pacs008, Pain001, Pain013, PartyBearing, PaymentMessage};
use crate::tenant::TenantId;

/// Graph collection holding account nodes.
pub const ACCOUNTS_COLLECTION: &str = "accounts";

/// Node reference for an account key (`accounts/<key>`).
pub fn account_node(key: &str) -> String {
    format!("{ACCOUNTS_COLLECTION}/{key}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRelationship {
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
    #[serde(rename = "TxTp")]
    pub tx_tp: String,
    #[serde(rename = "CreDtTm")]
    pub cre_dt_tm: String,
    #[serde(rename = "Amt")]
    pub amt: f64,
    #[serde(rename = "Ccy")]
    pub ccy: String,
    #[serde(rename = "PmtInfId")]
    pub pmt_inf_id: String,
    #[serde(rename = "EndToEndId")]
    pub end_to_end_id: String,
    #[serde(rename = "MsgId")]
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(rename = "TxSts", default, skip_serializing_if = "Option::is_none")]
    pub tx_sts: Option<String>,
    #[serde(rename = "TenantId")]
    pub tenant_id: String,
}

impl TransactionRelationship {
    /// Edge for a quote request (pain.001).
    pub fn for_quote_request(tenant_id: &TenantId, msg: &Pain001, keys: &PartyKeys) -> Self {
        Self::direct(tenant_id, msg, keys, msg.pmt_inf_id(), msg.geolocation())
    }

    /// Edge for a quote response (pain.013).
    pub fn for_quote_response(tenant_id: &TenantId, msg: &Pain013, keys: &PartyKeys) -> Self {
        Self::direct(tenant_id, msg, keys, msg.pmt_inf_id(), msg.geolocation())
    }

    /// Edge for a credit transfer (pacs.008). The instruction id stands in
    /// for the payment information id.
    pub fn for_credit_transfer(tenant_id: &TenantId, msg: &Pacs008, keys: &PartyKeys) -> Self {
        let geolocation = msg
            .fi_to_fi_cstmr_cdt_trf
            .splmtry_data
            .as_ref()
            .and_then(|d| d.geolocation());
        Self::direct(tenant_id, msg, keys, msg.instr_id(), geolocation)
    }

    /// Edge for a status report (pacs.002).
    ///
    /// The report carries no party identifiers, so both endpoints come from
    /// the resolved `DataCache`. The edge runs from the creditor account back
    /// to the debtor account.
    pub fn for_status_report(tenant_id: &TenantId, msg: &Pacs002, cache: &DataCache) -> Self {
        Self {
            from: account_node(&cache.cdtr_acct_id),
            to: account_node(&cache.dbtr_acct_id),
            tx_tp: msg.tx_tp.clone(),
            cre_dt_tm: msg.cre_dt_tm().to_string(),
            amt: cache.instd_amt.amt,
            ccy: cache.instd_amt.ccy.clone(),
            pmt_inf_id: msg.orgnl_instr_id().to_string(),
            end_to_end_id: msg.end_to_end_id().to_string(),
            msg_id: msg.msg_id().to_string(),
            lat: None,
            long: None,
            tx_sts: Some(msg.tx_sts().to_string()),
            tenant_id: tenant_id.to_string(),
        }
    }

    fn direct<M: PartyBearing>(
        tenant_id: &TenantId,
        msg: &M,
        keys: &PartyKeys,
        pmt_inf_id: &str,
        geolocation: Option<&Geolocation>,
    ) -> Self {
        let (amt, ccy) = msg
            .instructed_amount()
            .map(|a| (a.amt, a.ccy.clone()))
            .unwrap_or_default();

        Self {
            from: account_node(&keys.debtor_account),
            to: account_node(&keys.creditor_account),
            tx_tp: M::KIND.tx_tp().to_string(),
            cre_dt_tm: msg.cre_dt_tm().to_string(),
            amt,
            ccy,
            pmt_inf_id: pmt_inf_id.to_string(),
            end_to_end_id: msg.end_to_end_id().to_string(),
            msg_id: msg.msg_id().to_string(),
            lat: geolocation.map(|g| g.lat.clone()),
            long: geolocation.map(|g| g.long.clone()),
            tx_sts: None,
            tenant_id: tenant_id.to_string(),
        }
    }

    /// Both endpoints must name an account before the edge is persisted.
    pub fn validate(&self) -> TmsResult<()> {
        let prefix_len = ACCOUNTS_COLLECTION.len() + 1;
        for (field, node) in [("_from", &self.from), ("_to", &self.to)] {
            if node.len() <= prefix_len {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "relationship endpoint has no account key".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
