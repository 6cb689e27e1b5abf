//! DataCache correlation entry
//!
//! Short-lived record that ties a credit transfer's end-to-end id to the
//! pseudonym keys and amounts a later status report needs. The cache store
//! owns expiry; this type only knows how to be built and (de)serialized.

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, TmsResult};
use crate::keys::{KeyMode, PartyKeys};
use crate::message::{AmountValue, Pacs008, PartyBearing, PaymentMessage};

/// Amount as stored in the cache (`{amt, ccy}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheAmount {
    pub amt: f64,
    pub ccy: String,
}

impl From<&AmountValue> for CacheAmount {
    fn from(value: &AmountValue) -> Self {
        Self {
            amt: value.amt,
            ccy: value.ccy.clone(),
        }
    }
}

/// Correlation entry keyed by `tenant:EndToEndId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCache {
    pub dbtr_id: String,
    pub cdtr_id: String,
    pub dbtr_acct_id: String,
    pub cdtr_acct_id: String,
    pub cre_dt_tm: String,
    pub instd_amt: CacheAmount,
    pub intr_bk_sttlm_amt: CacheAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xchg_rate: Option<f64>,
}

impl DataCache {
    /// Build the entry for a credit transfer.
    ///
    /// Used both when the transfer is first processed and when the entry is
    /// rebuilt from history, so the two paths cannot drift apart.
    pub fn from_credit_transfer(tenant_id: &str, msg: &Pacs008, mode: KeyMode) -> TmsResult<Self> {
        let keys = PartyKeys::derive(tenant_id, &msg.parties()?, mode);
        Ok(Self::assemble(keys, msg))
    }

    /// Build the entry from keys that were already derived for `msg`.
    pub fn assemble(keys: PartyKeys, msg: &Pacs008) -> Self {
        let tx = msg.transaction();
        Self {
            dbtr_id: keys.debtor_entity,
            cdtr_id: keys.creditor_entity,
            dbtr_acct_id: keys.debtor_account,
            cdtr_acct_id: keys.creditor_account,
            cre_dt_tm: msg.cre_dt_tm().to_string(),
            instd_amt: CacheAmount::from(&tx.instd_amt.amt),
            intr_bk_sttlm_amt: CacheAmount::from(&tx.intr_bk_sttlm_amt.amt),
            xchg_rate: tx.xchg_rate,
        }
    }

    pub fn to_bytes(&self) -> TmsResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            StorageError::Serialization {
                what: "DataCache".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Decode a cached payload. Malformed payloads are reported as `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> Pacs008 {
        serde_json::from_value(serde_json::json!({
            "FIToFICstmrCdtTrf": {
                "GrpHdr": {"MsgId": "msg-1", "CreDtTm": "2023-02-03T07:17:52.216Z"},
                "CdtTrfTxInf": {
                    "PmtId": {"InstrId": "instr-1", "EndToEndId": "e2e-1"},
                    "IntrBkSttlmAmt": {"Amt": {"Amt": 31020.89, "Ccy": "USD"}},
                    "InstdAmt": {"Amt": {"Amt": 9000.0, "Ccy": "ZAR"}},
                    "XchgRate": 0.0698,
                    "Dbtr": {"Id": {"PrvtId": {"Othr": [{"Id": "+07-197368463", "SchmeNm": {"Prtry": "MSISDN"}}]}}},
                    "DbtrAcct": {"Id": {"Othr": [{"Id": "1010101010", "SchmeNm": {"Prtry": "Mxx"}}]}},
                    "DbtrAgt": {"FinInstnId": {"ClrSysMmbId": {"MmbId": "fsp001"}}},
                    "Cdtr": {"Id": {"PrvtId": {"Othr": [{"Id": "+01-710694778", "SchmeNm": {"Prtry": "MSISDN"}}]}}},
                    "CdtrAcct": {"Id": {"Othr": [{"Id": "2020202020", "SchmeNm": {"Prtry": "Mxx"}}]}},
                    "CdtrAgt": {"FinInstnId": {"ClrSysMmbId": {"MmbId": "fsp002"}}}
                }
            }
        }))
        .expect("valid pacs.008")
    }

    #[test]
    fn test_from_credit_transfer_tenant_keys() -> TmsResult<()> {
        let cache = DataCache::from_credit_transfer("tenant999", &transfer(), KeyMode::Tenant)?;
        assert_eq!(cache.dbtr_id, "tenant999+07-197368463MSISDN");
        assert_eq!(cache.cdtr_id, "tenant999+01-710694778MSISDN");
        assert_eq!(cache.dbtr_acct_id, "tenant9991010101010Mxxfsp001");
        assert_eq!(cache.cdtr_acct_id, "tenant9992020202020Mxxfsp002");
        assert_eq!(cache.instd_amt.ccy, "ZAR");
        assert_eq!(cache.intr_bk_sttlm_amt.amt, 31020.89);
        assert_eq!(cache.xchg_rate, Some(0.0698));
        assert_eq!(cache.cre_dt_tm, "2023-02-03T07:17:52.216Z");
        Ok(())
    }

    #[test]
    fn test_legacy_mode_hashes_accounts_only() -> TmsResult<()> {
        let cache = DataCache::from_credit_transfer("tenant999", &transfer(), KeyMode::Legacy)?;
        assert_eq!(cache.dbtr_id, "tenant999+07-197368463MSISDN");
        assert_eq!(cache.dbtr_acct_id.len(), 64);
        assert!(!cache.dbtr_acct_id.contains("tenant999"));
        Ok(())
    }

    #[test]
    fn test_wire_names() -> TmsResult<()> {
        let cache = DataCache::from_credit_transfer("DEFAULT", &transfer(), KeyMode::Tenant)?;
        let json: serde_json::Value = serde_json::from_slice(&cache.to_bytes()?).expect("json");
        assert_eq!(json["dbtrAcctId"], "DEFAULT1010101010Mxxfsp001");
        assert_eq!(json["instdAmt"]["ccy"], "ZAR");
        assert_eq!(json["intrBkSttlmAmt"]["amt"], 31020.89);
        assert_eq!(json["xchgRate"], 0.0698);
        Ok(())
    }

    #[test]
    fn test_malformed_payload_decodes_as_none() {
        assert!(DataCache::from_bytes(b"not json").is_none());
        assert!(DataCache::from_bytes(br#"{"dbtrId":"only-one-field"}"#).is_none());
    }
}
