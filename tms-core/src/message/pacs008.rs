//! pacs.008 - FI to FI customer credit transfer

use serde::{Deserialize, Serialize};

use super::common::{Account, ActiveAmount, Agent, AmountValue, GroupHeader, Party, SupplementaryData};
use super::{party_refs, MessageKind, PartyBearing, PartyRefs, PaymentMessage};
use crate::error::TmsResult;
use crate::tenant::TenantId;

fn default_tx_tp() -> String {
    MessageKind::Pacs008.tx_tp().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pacs008 {
    #[serde(rename = "TxTp", default = "default_tx_tp")]
    pub tx_tp: String,
    #[serde(rename = "TenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "FIToFICstmrCdtTrf")]
    pub fi_to_fi_cstmr_cdt_trf: FiToFiCustomerCreditTransfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FiToFiCustomerCreditTransfer {
    pub grp_hdr: GroupHeader,
    pub cdt_trf_tx_inf: CreditTransferTransaction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splmtry_data: Option<SupplementaryData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentIdentification {
    pub instr_id: String,
    pub end_to_end_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreditTransferTransaction {
    pub pmt_id: PaymentIdentification,
    pub intr_bk_sttlm_amt: ActiveAmount,
    pub instd_amt: ActiveAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xchg_rate: Option<f64>,
    pub dbtr: Party,
    pub dbtr_acct: Account,
    pub dbtr_agt: Agent,
    pub cdtr: Party,
    pub cdtr_acct: Account,
    pub cdtr_agt: Agent,
}

impl Pacs008 {
    pub fn transaction(&self) -> &CreditTransferTransaction {
        &self.fi_to_fi_cstmr_cdt_trf.cdt_trf_tx_inf
    }

    pub fn instr_id(&self) -> &str {
        &self.transaction().pmt_id.instr_id
    }

    pub fn interbank_settlement_amount(&self) -> &AmountValue {
        &self.transaction().intr_bk_sttlm_amt.amt
    }

    pub fn exchange_rate(&self) -> Option<f64> {
        self.transaction().xchg_rate
    }
}

impl PaymentMessage for Pacs008 {
    const KIND: MessageKind = MessageKind::Pacs008;

    fn msg_id(&self) -> &str {
        &self.fi_to_fi_cstmr_cdt_trf.grp_hdr.msg_id
    }

    fn cre_dt_tm(&self) -> &str {
        &self.fi_to_fi_cstmr_cdt_trf.grp_hdr.cre_dt_tm
    }

    fn end_to_end_id(&self) -> &str {
        &self.transaction().pmt_id.end_to_end_id
    }

    fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn set_tenant_id(&mut self, tenant_id: &TenantId) {
        self.tenant_id = Some(tenant_id.to_string());
    }
}

impl PartyBearing for Pacs008 {
    fn parties(&self) -> TmsResult<PartyRefs<'_>> {
        let tx = self.transaction();
        party_refs(
            &tx.dbtr,
            &tx.dbtr_acct,
            &tx.dbtr_agt,
            &tx.cdtr,
            &tx.cdtr_acct,
            &tx.cdtr_agt,
        )
    }

    fn instructed_amount(&self) -> Option<&AmountValue> {
        Some(&self.transaction().instd_amt.amt)
    }
}
