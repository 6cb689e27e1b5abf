//! pain.013 - creditor payment activation request (quote response)

use serde::{Deserialize, Serialize};

use super::common::{AmountValue, GroupHeader, SupplementaryData};
use super::pain001::PaymentInstruction;
use super::{MessageKind, PartyBearing, PartyRefs, PaymentMessage};
use crate::error::TmsResult;
use crate::tenant::TenantId;

fn default_tx_tp() -> String {
    MessageKind::Pain013.tx_tp().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pain013 {
    #[serde(rename = "TxTp", default = "default_tx_tp")]
    pub tx_tp: String,
    #[serde(rename = "TenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "CdtrPmtActvtnReq")]
    pub cdtr_pmt_actvtn_req: CreditorPaymentActivationRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreditorPaymentActivationRequest {
    pub grp_hdr: GroupHeader,
    pub pmt_inf: PaymentInstruction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splmtry_data: Option<SupplementaryData>,
}

impl Pain013 {
    pub fn pmt_inf_id(&self) -> &str {
        &self.cdtr_pmt_actvtn_req.pmt_inf.pmt_inf_id
    }

    pub fn geolocation(&self) -> Option<&super::Geolocation> {
        self.cdtr_pmt_actvtn_req.splmtry_data.as_ref()?.geolocation()
    }
}

impl PaymentMessage for Pain013 {
    const KIND: MessageKind = MessageKind::Pain013;

    fn msg_id(&self) -> &str {
        &self.cdtr_pmt_actvtn_req.grp_hdr.msg_id
    }

    fn cre_dt_tm(&self) -> &str {
        &self.cdtr_pmt_actvtn_req.grp_hdr.cre_dt_tm
    }

    fn end_to_end_id(&self) -> &str {
        &self.cdtr_pmt_actvtn_req.pmt_inf.cdt_trf_tx_inf.pmt_id.end_to_end_id
    }

    fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn set_tenant_id(&mut self, tenant_id: &TenantId) {
        self.tenant_id = Some(tenant_id.to_string());
    }
}

impl PartyBearing for Pain013 {
    fn parties(&self) -> TmsResult<PartyRefs<'_>> {
        self.cdtr_pmt_actvtn_req.pmt_inf.parties()
    }

    fn instructed_amount(&self) -> Option<&AmountValue> {
        Some(self.cdtr_pmt_actvtn_req.pmt_inf.instructed_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_quote_response() -> TmsResult<()> {
        let msg: Pain013 = serde_json::from_value(serde_json::json!({
            "TenantId": "tenant999",
            "CdtrPmtActvtnReq": {
                "GrpHdr": {"MsgId": "msg-pain013", "CreDtTm": "2023-02-03T07:17:53.000Z"},
                "PmtInf": {
                    "PmtInfId": "pmtinf-1",
                    "Dbtr": {"Id": {"PrvtId": {"Othr": [{"Id": "+07-197368463", "SchmeNm": {"Prtry": "MSISDN"}}]}}},
                    "DbtrAcct": {"Id": {"Othr": [{"Id": "1010101010", "SchmeNm": {"Prtry": "Mxx"}}]}},
                    "DbtrAgt": {"FinInstnId": {"ClrSysMmbId": {"MmbId": "fsp001"}}},
                    "CdtTrfTxInf": {
                        "PmtId": {"EndToEndId": "e2e-quote"},
                        "Amt": {"InstdAmt": {"Amt": {"Amt": 100.5, "Ccy": "USD"}}},
                        "Cdtr": {"Id": {"PrvtId": {"Othr": [{"Id": "+01-710694778", "SchmeNm": {"Prtry": "MSISDN"}}]}}},
                        "CdtrAcct": {"Id": {"Othr": [{"Id": "2020202020", "SchmeNm": {"Prtry": "Mxx"}}]}},
                        "CdtrAgt": {"FinInstnId": {"ClrSysMmbId": {"MmbId": "fsp002"}}}
                    }
                }
            }
        }))
        .expect("valid pain.013");

        assert_eq!(msg.tx_tp, "pain.013.001.09");
        assert_eq!(PaymentMessage::tenant_id(&msg), Some("tenant999"));
        assert_eq!(msg.end_to_end_id(), "e2e-quote");
        assert_eq!(msg.parties()?.creditor.id, "+01-710694778");
        assert!(msg.geolocation().is_none());
        Ok(())
    }
}
