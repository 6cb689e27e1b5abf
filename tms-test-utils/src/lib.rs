//! TMS Test Utilities
//!
//! Shared fixtures and proptest generators:
//! - the `tenant999` credit transfer / status report scenario
//! - quote request and quote response messages with the same parties
//! - generators for tenants, identifiers and credit transfers

pub use tms_core::{
    DataCache, KeyMode, Pacs002, Pacs008, Pain001, Pain013, PartyKeys, TenantId, TmsError,
    TmsResult, DEFAULT_TENANT_ID,
};

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use serde_json::{json, Value};
    use tms_core::{Pacs002, Pacs008, Pain001, Pain013};

    pub const TENANT: &str = "tenant999";
    pub const DEBTOR_ID: &str = "+07-197368463";
    pub const CREDITOR_ID: &str = "+01-710694778";
    pub const PARTY_SCHEME: &str = "MSISDN";
    pub const DEBTOR_ACCOUNT_ID: &str = "1010101010";
    pub const CREDITOR_ACCOUNT_ID: &str = "2020202020";
    pub const ACCOUNT_SCHEME: &str = "Mxx";
    pub const DEBTOR_MEMBER: &str = "fsp001";
    pub const CREDITOR_MEMBER: &str = "fsp002";
    pub const END_TO_END_ID: &str = "701b-ae14-46fd-a2cf-88dda2875fdd";
    pub const INSTR_ID: &str = "4ca819baa65d4a2c9e062f2055525046";

    fn party(id: &str) -> Value {
        json!({"Id": {"PrvtId": {"Othr": [{"Id": id, "SchmeNm": {"Prtry": PARTY_SCHEME}}]}}})
    }

    fn account(id: &str) -> Value {
        json!({"Id": {"Othr": [{"Id": id, "SchmeNm": {"Prtry": ACCOUNT_SCHEME}}]}})
    }

    fn agent(member: &str) -> Value {
        json!({"FinInstnId": {"ClrSysMmbId": {"MmbId": member}}})
    }

    fn geolocation() -> Value {
        json!({"Envlp": {"Doc": {"InitgPty": {"Glctn": {"Lat": "-3.1291", "Long": "39.0006"}}}}})
    }

    /// Credit transfer with the scenario parties. No `TenantId` is set.
    pub fn pacs008_json(end_to_end_id: &str) -> Value {
        json!({
            "TxTp": "pacs.008.001.10",
            "FIToFICstmrCdtTrf": {
                "GrpHdr": {"MsgId": "cabb-32c3-4ecf-944e-654855c80c38", "CreDtTm": "2023-02-03T07:17:52.216Z", "NbOfTxs": 1},
                "CdtTrfTxInf": {
                    "PmtId": {"InstrId": INSTR_ID, "EndToEndId": end_to_end_id},
                    "IntrBkSttlmAmt": {"Amt": {"Amt": 31020.89, "Ccy": "USD"}},
                    "InstdAmt": {"Amt": {"Amt": 9000.0, "Ccy": "ZAR"}},
                    "XchgRate": 0.0698,
                    "Dbtr": party(DEBTOR_ID),
                    "DbtrAcct": account(DEBTOR_ACCOUNT_ID),
                    "DbtrAgt": agent(DEBTOR_MEMBER),
                    "Cdtr": party(CREDITOR_ID),
                    "CdtrAcct": account(CREDITOR_ACCOUNT_ID),
                    "CdtrAgt": agent(CREDITOR_MEMBER)
                }
            }
        })
    }

    pub fn pacs008(end_to_end_id: &str) -> Pacs008 {
        serde_json::from_value(pacs008_json(end_to_end_id)).expect("fixture pacs.008 is valid")
    }

    /// Status report referencing `end_to_end_id`.
    pub fn pacs002_json(end_to_end_id: &str, status: &str) -> Value {
        json!({
            "TxTp": "pacs.002.001.12",
            "FIToFIPmtSts": {
                "GrpHdr": {"MsgId": "30bea71c5a054978ad0da7f94b2a40e9", "CreDtTm": "2023-02-03T07:17:55.000Z"},
                "TxInfAndSts": {
                    "OrgnlInstrId": INSTR_ID,
                    "OrgnlEndToEndId": end_to_end_id,
                    "TxSts": status,
                    "AccptncDtTm": "2023-02-03T07:17:54.000Z"
                }
            }
        })
    }

    pub fn pacs002(end_to_end_id: &str, status: &str) -> Pacs002 {
        serde_json::from_value(pacs002_json(end_to_end_id, status)).expect("fixture pacs.002 is valid")
    }

    fn payment_instruction(end_to_end_id: &str) -> Value {
        json!({
            "PmtInfId": "5ab4fc7355de4ef8a75b78b00a681ed2",
            "Dbtr": party(DEBTOR_ID),
            "DbtrAcct": account(DEBTOR_ACCOUNT_ID),
            "DbtrAgt": agent(DEBTOR_MEMBER),
            "CdtTrfTxInf": {
                "PmtId": {"EndToEndId": end_to_end_id},
                "Amt": {"InstdAmt": {"Amt": {"Amt": 9000.0, "Ccy": "ZAR"}}},
                "Cdtr": party(CREDITOR_ID),
                "CdtrAcct": account(CREDITOR_ACCOUNT_ID),
                "CdtrAgt": agent(CREDITOR_MEMBER)
            }
        })
    }

    /// Quote request with geolocation.
    pub fn pain001_json(end_to_end_id: &str) -> Value {
        json!({
            "TxTp": "pain.001.001.11",
            "CstmrCdtTrfInitn": {
                "GrpHdr": {"MsgId": "8f3b1c0a7d2e4f6b9a1c3e5d7f9b2a4c", "CreDtTm": "2023-02-03T07:17:50.000Z"},
                "PmtInf": payment_instruction(end_to_end_id),
                "SplmtryData": geolocation()
            }
        })
    }

    pub fn pain001(end_to_end_id: &str) -> Pain001 {
        serde_json::from_value(pain001_json(end_to_end_id)).expect("fixture pain.001 is valid")
    }

    /// Quote response.
    pub fn pain013_json(end_to_end_id: &str) -> Value {
        json!({
            "TxTp": "pain.013.001.09",
            "CdtrPmtActvtnReq": {
                "GrpHdr": {"MsgId": "1e9c3a5b7d0f4a2c8e6b4d2f0a8c6e4b", "CreDtTm": "2023-02-03T07:17:51.000Z"},
                "PmtInf": payment_instruction(end_to_end_id),
                "SplmtryData": geolocation()
            }
        })
    }

    pub fn pain013(end_to_end_id: &str) -> Pain013 {
        serde_json::from_value(pain013_json(end_to_end_id)).expect("fixture pain.013 is valid")
    }

    /// Keys the scenario parties derive to under `tenant` in tenant mode.
    pub fn expected_keys(tenant: &str) -> tms_core::PartyKeys {
        tms_core::PartyKeys {
            debtor_entity: format!("{tenant}{DEBTOR_ID}{PARTY_SCHEME}"),
            creditor_entity: format!("{tenant}{CREDITOR_ID}{PARTY_SCHEME}"),
            debtor_account: format!("{tenant}{DEBTOR_ACCOUNT_ID}{ACCOUNT_SCHEME}{DEBTOR_MEMBER}"),
            creditor_account: format!(
                "{tenant}{CREDITOR_ACCOUNT_ID}{ACCOUNT_SCHEME}{CREDITOR_MEMBER}"
            ),
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;
    use serde_json::json;
    use tms_core::{Pacs008, TenantId};

    /// Tenant ids without the cache-key separator.
    pub fn arb_tenant_id() -> impl Strategy<Value = TenantId> {
        "[A-Za-z][A-Za-z0-9_-]{0,15}".prop_map(TenantId::new)
    }

    /// Raw party or account identifier.
    pub fn arb_raw_id() -> impl Strategy<Value = String> {
        "[+0-9][0-9-]{3,15}"
    }

    pub fn arb_scheme() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("MSISDN".to_string()),
            Just("EMAIL".to_string()),
            "[A-Z][a-z]{1,5}",
        ]
    }

    pub fn arb_member_id() -> impl Strategy<Value = String> {
        "fsp[0-9]{3}"
    }

    pub fn arb_end_to_end_id() -> impl Strategy<Value = String> {
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}"
    }

    /// Credit transfer with arbitrary parties, amounts and correlation id.
    pub fn arb_pacs008() -> impl Strategy<Value = Pacs008> {
        (
            arb_end_to_end_id(),
            (arb_raw_id(), arb_scheme(), arb_raw_id(), arb_member_id()),
            (arb_raw_id(), arb_scheme(), arb_raw_id(), arb_member_id()),
            (1u32..10_000_000u32, prop_oneof![Just("USD"), Just("ZAR"), Just("EUR")]),
        )
            .prop_map(|(e2e, dbtr, cdtr, (cents, ccy))| {
                let party = |id: &str, scheme: &str| {
                    json!({"Id": {"PrvtId": {"Othr": [{"Id": id, "SchmeNm": {"Prtry": scheme}}]}}})
                };
                let account = |id: &str| json!({"Id": {"Othr": [{"Id": id, "SchmeNm": {"Prtry": "Mxx"}}]}});
                let agent = |member: &str| json!({"FinInstnId": {"ClrSysMmbId": {"MmbId": member}}});
                let amount = f64::from(cents) / 100.0;

                serde_json::from_value(json!({
                    "FIToFICstmrCdtTrf": {
                        "GrpHdr": {"MsgId": format!("msg-{e2e}"), "CreDtTm": "2023-02-03T07:17:52.216Z"},
                        "CdtTrfTxInf": {
                            "PmtId": {"InstrId": format!("instr-{e2e}"), "EndToEndId": e2e},
                            "IntrBkSttlmAmt": {"Amt": {"Amt": amount, "Ccy": ccy}},
                            "InstdAmt": {"Amt": {"Amt": amount, "Ccy": ccy}},
                            "XchgRate": 1.0,
                            "Dbtr": party(&dbtr.0, &dbtr.1),
                            "DbtrAcct": account(&dbtr.2),
                            "DbtrAgt": agent(&dbtr.3),
                            "Cdtr": party(&cdtr.0, &cdtr.1),
                            "CdtrAcct": account(&cdtr.2),
                            "CdtrAgt": agent(&cdtr.3)
                        }
                    }
                }))
                .expect("generated pacs.008 is valid")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use tms_core::{KeyMode, PartyBearing, PartyKeys, PaymentMessage};

    #[test]
    fn test_fixture_keys_match_derivation() -> tms_core::TmsResult<()> {
        let msg = pacs008(END_TO_END_ID);
        let derived = PartyKeys::derive(TENANT, &msg.parties()?, KeyMode::Tenant);
        assert_eq!(derived, expected_keys(TENANT));
        assert_eq!(derived.debtor_entity, "tenant999+07-197368463MSISDN");
        Ok(())
    }

    #[test]
    fn test_fixtures_share_correlation_id() {
        assert_eq!(pacs002(END_TO_END_ID, "ACCC").end_to_end_id(), pacs008(END_TO_END_ID).end_to_end_id());
        assert_eq!(pain001("q1").end_to_end_id(), "q1");
        assert_eq!(pain013("q1").end_to_end_id(), "q1");
    }
}
