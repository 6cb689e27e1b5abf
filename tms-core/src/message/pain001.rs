//! pain.001 - customer credit transfer initiation (quote request)

use serde::{Deserialize, Serialize};

use super::common::{Account, Agent, AmountValue, GroupHeader, Party, SupplementaryData};
use super::{party_refs, MessageKind, PartyBearing, PartyRefs, PaymentMessage};
use crate::error::TmsResult;
use crate::tenant::TenantId;

fn default_tx_tp() -> String {
    MessageKind::Pain001.tx_tp().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pain001 {
    #[serde(rename = "TxTp", default = "default_tx_tp")]
    pub tx_tp: String,
    #[serde(rename = "TenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "CstmrCdtTrfInitn")]
    pub cstmr_cdt_trf_initn: CustomerCreditTransferInitiation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerCreditTransferInitiation {
    pub grp_hdr: GroupHeader,
    pub pmt_inf: PaymentInstruction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splmtry_data: Option<SupplementaryData>,
}

/// Payment information block (`PmtInf`), shared with pain.013.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentInstruction {
    pub pmt_inf_id: String,
    pub dbtr: Party,
    pub dbtr_acct: Account,
    pub dbtr_agt: Agent,
    pub cdt_trf_tx_inf: PaymentInstructionTransaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentInstructionTransaction {
    pub pmt_id: QuotePaymentId,
    pub amt: QuoteAmount,
    pub cdtr: Party,
    pub cdtr_acct: Account,
    pub cdtr_agt: Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuotePaymentId {
    pub end_to_end_id: String,
}

/// `Amt.InstdAmt.Amt`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QuoteAmount {
    pub instd_amt: super::ActiveAmount,
}

impl PaymentInstruction {
    pub(crate) fn parties(&self) -> TmsResult<PartyRefs<'_>> {
        let tx = &self.cdt_trf_tx_inf;
        party_refs(
            &self.dbtr,
            &self.dbtr_acct,
            &self.dbtr_agt,
            &tx.cdtr,
            &tx.cdtr_acct,
            &tx.cdtr_agt,
        )
    }

    pub(crate) fn instructed_amount(&self) -> &AmountValue {
        &self.cdt_trf_tx_inf.amt.instd_amt.amt
    }
}

impl Pain001 {
    pub fn pmt_inf_id(&self) -> &str {
        &self.cstmr_cdt_trf_initn.pmt_inf.pmt_inf_id
    }

    pub fn geolocation(&self) -> Option<&super::Geolocation> {
        self.cstmr_cdt_trf_initn.splmtry_data.as_ref()?.geolocation()
    }
}

impl PaymentMessage for Pain001 {
    const KIND: MessageKind = MessageKind::Pain001;

    fn msg_id(&self) -> &str {
        &self.cstmr_cdt_trf_initn.grp_hdr.msg_id
    }

    fn cre_dt_tm(&self) -> &str {
        &self.cstmr_cdt_trf_initn.grp_hdr.cre_dt_tm
    }

    fn end_to_end_id(&self) -> &str {
        &self.cstmr_cdt_trf_initn.pmt_inf.cdt_trf_tx_inf.pmt_id.end_to_end_id
    }

    fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn set_tenant_id(&mut self, tenant_id: &TenantId) {
        self.tenant_id = Some(tenant_id.to_string());
    }
}

impl PartyBearing for Pain001 {
    fn parties(&self) -> TmsResult<PartyRefs<'_>> {
        self.cstmr_cdt_trf_initn.pmt_inf.parties()
    }

    fn instructed_amount(&self) -> Option<&AmountValue> {
        Some(self.cstmr_cdt_trf_initn.pmt_inf.instructed_amount())
    }
}
