//! pacs.002 - FI to FI payment status report

use serde::{Deserialize, Serialize};

use super::common::GroupHeader;
use super::{MessageKind, PaymentMessage};
use crate::tenant::TenantId;

fn default_tx_tp() -> String {
    MessageKind::Pacs002.tx_tp().to_string()
}

/// Status report. Carries no raw party identifiers; the parties are
/// recovered through the `DataCache` of the original transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pacs002 {
    #[serde(rename = "TxTp", default = "default_tx_tp")]
    pub tx_tp: String,
    #[serde(rename = "TenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "FIToFIPmtSts")]
    pub fi_to_fi_pmt_sts: FiToFiPaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FiToFiPaymentStatus {
    pub grp_hdr: GroupHeader,
    pub tx_inf_and_sts: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionStatus {
    pub orgnl_instr_id: String,
    pub orgnl_end_to_end_id: String,
    pub tx_sts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accptnc_dt_tm: Option<String>,
}

impl Pacs002 {
    pub fn orgnl_instr_id(&self) -> &str {
        &self.fi_to_fi_pmt_sts.tx_inf_and_sts.orgnl_instr_id
    }

    pub fn tx_sts(&self) -> &str {
        &self.fi_to_fi_pmt_sts.tx_inf_and_sts.tx_sts
    }
}

impl PaymentMessage for Pacs002 {
    const KIND: MessageKind = MessageKind::Pacs002;

    fn msg_id(&self) -> &str {
        &self.fi_to_fi_pmt_sts.grp_hdr.msg_id
    }

    fn cre_dt_tm(&self) -> &str {
        &self.fi_to_fi_pmt_sts.grp_hdr.cre_dt_tm
    }

    /// The correlation id: end-to-end id of the original credit transfer.
    fn end_to_end_id(&self) -> &str {
        &self.fi_to_fi_pmt_sts.tx_inf_and_sts.orgnl_end_to_end_id
    }

    fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn set_tenant_id(&mut self, tenant_id: &TenantId) {
        self.tenant_id = Some(tenant_id.to_string());
    }
}
