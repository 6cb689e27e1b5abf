//! ISO20022 message models
//!
//! Only the elements the correlation pipeline reads are modelled. Field names
//! follow the ISO element names so that messages round-trip verbatim into the
//! transaction history.

mod common;
mod pacs002;
mod pacs008;
mod pain001;
mod pain013;

pub use common::{
    Account, AccountId, ActiveAmount, Agent, AmountValue, ClearingMember, Envelope,
    FinancialInstitutionId, Geolocation, GroupHeader, InitiatingParty, OtherId, OtherIdRef, Party,
    PartyId, PrivateId, SchemeName, SupplementaryData, SupplementaryDocument,
};
pub use pacs002::{FiToFiPaymentStatus, Pacs002, TransactionStatus};
pub use pacs008::{CreditTransferTransaction, FiToFiCustomerCreditTransfer, Pacs008, PaymentIdentification};
pub use pain001::{
    CustomerCreditTransferInitiation, Pain001, PaymentInstruction, PaymentInstructionTransaction,
    QuoteAmount, QuotePaymentId,
};
pub use pain013::{CreditorPaymentActivationRequest, Pain013};

use serde::{Deserialize, Serialize};

use crate::error::TmsResult;
use crate::tenant::TenantId;

/// The four message kinds handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Pain001,
    Pain013,
    Pacs008,
    Pacs002,
}

impl MessageKind {
    /// ISO transaction type (`TxTp`).
    pub fn tx_tp(&self) -> &'static str {
        match self {
            MessageKind::Pain001 => "pain.001.001.11",
            MessageKind::Pain013 => "pain.013.001.09",
            MessageKind::Pacs008 => "pacs.008.001.10",
            MessageKind::Pacs002 => "pacs.002.001.12",
        }
    }

    /// History collection the message is appended to.
    pub fn collection(&self) -> &'static str {
        match self {
            MessageKind::Pain001 => "pain001",
            MessageKind::Pain013 => "pain013",
            MessageKind::Pacs008 => "pacs008",
            MessageKind::Pacs002 => "pacs002",
        }
    }
}

/// Common accessors over inbound messages.
pub trait PaymentMessage: Serialize + Send + Sync {
    const KIND: MessageKind;

    fn msg_id(&self) -> &str;

    fn cre_dt_tm(&self) -> &str;

    /// End-to-end id, or the original end-to-end id for status reports.
    fn end_to_end_id(&self) -> &str;

    fn tenant_id(&self) -> Option<&str>;

    fn set_tenant_id(&mut self, tenant_id: &TenantId);
}

/// Borrowed view of the raw party identifiers of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyRefs<'a> {
    pub debtor: OtherIdRef<'a>,
    pub creditor: OtherIdRef<'a>,
    pub debtor_account: OtherIdRef<'a>,
    pub creditor_account: OtherIdRef<'a>,
    pub debtor_member: &'a str,
    pub creditor_member: &'a str,
}

/// Messages that carry raw debtor/creditor identifiers.
///
/// Status reports do not, which is why they need correlation.
pub trait PartyBearing: PaymentMessage {
    fn parties(&self) -> TmsResult<PartyRefs<'_>>;

    /// Instructed amount, if the message carries one.
    fn instructed_amount(&self) -> Option<&AmountValue>;
}

pub(crate) fn party_refs<'a>(
    dbtr: &'a Party,
    dbtr_acct: &'a Account,
    dbtr_agt: &'a Agent,
    cdtr: &'a Party,
    cdtr_acct: &'a Account,
    cdtr_agt: &'a Agent,
) -> TmsResult<PartyRefs<'a>> {
    Ok(PartyRefs {
        debtor: dbtr.first_other("Dbtr.Id.PrvtId.Othr")?,
        creditor: cdtr.first_other("Cdtr.Id.PrvtId.Othr")?,
        debtor_account: dbtr_acct.first_other("DbtrAcct.Id.Othr")?,
        creditor_account: cdtr_acct.first_other("CdtrAcct.Id.Othr")?,
        debtor_member: dbtr_agt.member_id(),
        creditor_member: cdtr_agt.member_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tx_tp_and_collection() {
        assert_eq!(MessageKind::Pacs008.tx_tp(), "pacs.008.001.10");
        assert_eq!(MessageKind::Pacs002.tx_tp(), "pacs.002.001.12");
        assert_eq!(MessageKind::Pain001.collection(), "pain001");
        assert_eq!(MessageKind::Pain013.collection(), "pain013");
    }

    #[test]
    fn test_kind_serializes_lowercase() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&MessageKind::Pacs008)?, "\"pacs008\"");
        Ok(())
    }
}
