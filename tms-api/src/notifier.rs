//! Downstream risk-service notification
//!
//! Every accepted transaction is forwarded to the risk-scoring service after
//! it has been persisted. Delivery runs on a background task; failures are
//! logged and never reach the HTTP caller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tms_core::DataCache;

use crate::error::{ApiError, ApiResult};

/// Processing metadata attached to every notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaData {
    /// Processing time in nanoseconds.
    #[serde(rename = "prcgTmDp")]
    pub prcg_tm_dp: u64,
}

/// Body posted to the risk service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub transaction: Value,
    #[serde(rename = "DataCache", skip_serializing_if = "Option::is_none")]
    pub data_cache: Option<DataCache>,
    #[serde(rename = "metaData")]
    pub meta_data: MetaData,
}

impl NotificationPayload {
    pub fn new(transaction: Value, data_cache: Option<DataCache>, elapsed: Duration) -> Self {
        Self {
            transaction,
            data_cache,
            meta_data: MetaData {
                prcg_tm_dp: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
            },
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `payload`. Implementations log their own failures.
    async fn notify(&self, payload: &NotificationPayload);
}

/// Fire-and-forget delivery on a background task.
pub fn spawn_notification(notifier: Arc<dyn Notifier>, payload: NotificationPayload) {
    tokio::spawn(async move {
        notifier.notify(&payload).await;
    });
}

// ============================================================================
// HTTP NOTIFIER
// ============================================================================

/// Posts notifications as JSON with reqwest.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, payload: &NotificationPayload) {
        let result = self
            .client
            .post(&self.endpoint)
            .header("User-Agent", "TMS-Notifier/1.0")
            .json(payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(
                    endpoint = %self.endpoint,
                    status = %response.status(),
                    "Risk service notified"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    status = %response.status(),
                    "Risk service notification failed with non-2xx status"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    error = %e,
                    "Risk service notification failed"
                );
            }
        }
    }
}

// ============================================================================
// LOCAL NOTIFIERS
// ============================================================================

/// Drops every notification. Used when no risk endpoint is configured.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, payload: &NotificationPayload) {
        tracing::trace!(prcg_tm_dp = payload.meta_data.prcg_tm_dp, "Notification skipped");
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationPayload>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &NotificationPayload) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }
    }
}
