//! Building blocks shared by the ISO20022 message models.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Group header (`GrpHdr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupHeader {
    pub msg_id: String,
    pub cre_dt_tm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_of_txs: Option<u32>,
}

/// A currency amount (`{Amt, Ccy}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmountValue {
    pub amt: f64,
    pub ccy: String,
}

/// ISO "active currency amount" wrapper (`{Amt: {Amt, Ccy}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveAmount {
    pub amt: AmountValue,
}

/// Proprietary scheme name (`SchmeNm.Prtry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchemeName {
    pub prtry: String,
}

/// Generic identification (`Othr` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OtherId {
    pub id: String,
    pub schme_nm: SchemeName,
}

/// Private identification (`PrvtId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrivateId {
    #[serde(default)]
    pub othr: Vec<OtherId>,
}

/// Party identification (`Id` of `Dbtr`/`Cdtr`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartyId {
    pub prvt_id: PrivateId,
}

/// Debtor or creditor party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Party {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub id: PartyId,
}

/// Account identification (`Id` of `DbtrAcct`/`CdtrAcct`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountId {
    #[serde(default)]
    pub othr: Vec<OtherId>,
}

/// Debtor or creditor account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
}

/// Clearing system member (`ClrSysMmbId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClearingMember {
    pub mmb_id: String,
}

/// Financial institution identification (`FinInstnId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FinancialInstitutionId {
    pub clr_sys_mmb_id: ClearingMember,
}

/// Debtor or creditor agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Agent {
    pub fin_instn_id: FinancialInstitutionId,
}

impl Agent {
    pub fn member_id(&self) -> &str {
        &self.fin_instn_id.clr_sys_mmb_id.mmb_id
    }
}

/// Borrowed `(id, scheme)` pair taken from the first `Othr` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherIdRef<'a> {
    pub id: &'a str,
    pub scheme: &'a str,
}

fn first_other<'a>(othr: &'a [OtherId], field: &str) -> Result<OtherIdRef<'a>, ValidationError> {
    othr.first()
        .map(|o| OtherIdRef {
            id: &o.id,
            scheme: &o.schme_nm.prtry,
        })
        .ok_or_else(|| ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        })
}

impl Party {
    /// First private identifier, naming `field` when it is missing.
    pub fn first_other(&self, field: &str) -> Result<OtherIdRef<'_>, ValidationError> {
        first_other(&self.id.prvt_id.othr, field)
    }
}

impl Account {
    /// First account identifier, naming `field` when it is missing.
    pub fn first_other(&self, field: &str) -> Result<OtherIdRef<'_>, ValidationError> {
        first_other(&self.id.othr, field)
    }
}

/// Geolocation (`Glctn`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geolocation {
    pub lat: String,
    pub long: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiatingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glctn: Option<Geolocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupplementaryDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initg_pty: Option<InitiatingParty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<SupplementaryDocument>,
}

/// Supplementary data (`SplmtryData`), used for initiating-party geolocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupplementaryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envlp: Option<Envelope>,
}

impl SupplementaryData {
    pub fn geolocation(&self) -> Option<&Geolocation> {
        self.envlp
            .as_ref()?
            .doc
            .as_ref()?
            .initg_pty
            .as_ref()?
            .glctn
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_deserializes_iso_names() -> Result<(), serde_json::Error> {
        let party: Party = serde_json::from_value(serde_json::json!({
            "Nm": "April Blake Grant",
            "Id": {"PrvtId": {"Othr": [{"Id": "+27-730975224", "SchmeNm": {"Prtry": "MSISDN"}}]}}
        }))?;
        let other = party.first_other("Dbtr.Id.PrvtId.Othr").expect("has Othr");
        assert_eq!(other.id, "+27-730975224");
        assert_eq!(other.scheme, "MSISDN");
        Ok(())
    }

    #[test]
    fn test_missing_other_names_field() {
        let account = Account {
            id: AccountId { othr: vec![] },
            nm: None,
        };
        let err = account.first_other("DbtrAcct.Id.Othr").unwrap_err();
        assert_eq!(
            err,
            ValidationError::RequiredFieldMissing {
                field: "DbtrAcct.Id.Othr".to_string()
            }
        );
    }

    #[test]
    fn test_geolocation_path() -> Result<(), serde_json::Error> {
        let data: SupplementaryData = serde_json::from_value(serde_json::json!({
            "Envlp": {"Doc": {"InitgPty": {"Glctn": {"Lat": "-3.1291", "Long": "39.0006"}}}}
        }))?;
        let glctn = data.geolocation().expect("geolocation present");
        assert_eq!(glctn.lat, "-3.1291");
        assert_eq!(glctn.long, "39.0006");

        let empty: SupplementaryData = serde_json::from_value(serde_json::json!({}))?;
        assert!(empty.geolocation().is_none());
        Ok(())
    }
}
