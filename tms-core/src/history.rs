//! Transaction history envelope
//!
//! Every inbound message is appended verbatim, wrapped with the tenant and the
//! correlation id it is looked up by. History is the source of truth that the
//! DataCache is rebuilt from.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{StorageError, TmsResult};
use crate::message::PaymentMessage;
use crate::tenant::TenantId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// UUIDv7, so ids sort by append time.
    pub id: Uuid,
    pub collection: String,
    pub tenant_id: String,
    pub correlation_id: String,
    pub cre_dt_tm: String,
    pub recorded_at: DateTime<Utc>,
    pub document: Value,
}

impl HistoryRecord {
    pub fn from_message<M: PaymentMessage>(tenant_id: &TenantId, msg: &M) -> TmsResult<Self> {
        let document = serde_json::to_value(msg).map_err(|e| StorageError::Serialization {
            what: M::KIND.collection().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: Uuid::now_v7(),
            collection: M::KIND.collection().to_string(),
            tenant_id: tenant_id.to_string(),
            correlation_id: msg.end_to_end_id().to_string(),
            cre_dt_tm: msg.cre_dt_tm().to_string(),
            recorded_at: Utc::now(),
            document,
        })
    }

    /// Parse the stored document back into a message type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.document)
    }
}

/// Order records newest first.
pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Flatten ragged query output into a list of documents.
///
/// Document stores may return nested arrays (one level per sub-query) with
/// `null` placeholders for empty slots; both are normalised away here.
pub fn flatten_documents(value: Value) -> Vec<Value> {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    out
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Null => {}
        other => out.push(other),
    }
}
