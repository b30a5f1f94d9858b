// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flow Access Node REST client for the read side of the chain.
//!
//! Only two endpoints are used:
//!
//! | Endpoint | Purpose |
//! |----------|---------|
//! | `POST /v1/scripts?block_height=sealed` | Execute a read-only script |
//! | `GET /v1/transaction_results/{id}` | Fetch a transaction's status |
//!
//! Scripts and their JSON-Cadence arguments travel base64-encoded; the
//! script result is a base64 JSON-Cadence document.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::cadence::CadenceValue;
use super::types::{Script, TransactionId, TransactionStatus, TransactionStatusUpdate};
use crate::error::ClientError;

/// Buffered status updates per watched transaction.
const STATUS_CHANNEL_CAPACITY: usize = 16;

#[derive(Serialize)]
struct ScriptBody {
    script: String,
    arguments: Vec<String>,
}

#[derive(Deserialize)]
struct TransactionResultBody {
    status: TransactionStatus,
    #[serde(default)]
    status_code: u32,
    #[serde(default)]
    error_message: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Access node REST client.
#[derive(Clone)]
pub struct AccessNodeClient {
    base_url: Url,
    http: reqwest::Client,
}

impl AccessNodeClient {
    /// Every request to the node fails with a transport error once
    /// `timeout` elapses.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Execute a script against the latest sealed block.
    pub async fn execute_script(&self, script: &Script) -> Result<CadenceValue, ClientError> {
        let arguments = script
            .args
            .iter()
            .map(|arg| arg.encode().map(|bytes| STANDARD.encode(bytes)))
            .collect::<Result<Vec<_>, _>>()?;

        let body = ScriptBody {
            script: STANDARD.encode(script.cadence.as_bytes()),
            arguments,
        };

        let response = self
            .http
            .post(self.endpoint("v1/scripts"))
            .query(&[("block_height", "sealed")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(if status.is_client_error() {
                ClientError::Query(message)
            } else {
                ClientError::Transport(format!("access node returned {status}: {message}"))
            });
        }

        let encoded: String = response.json().await?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ClientError::Decode(format!("script result is not base64: {e}")))?;
        CadenceValue::decode(&bytes)
    }

    /// Fetch the current status of a transaction.
    pub async fn transaction_result(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionStatusUpdate, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("v1/transaction_results/{id}")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::Transport(format!(
                "transaction result for {id} returned {status}: {message}"
            )));
        }

        let body: TransactionResultBody = response.json().await?;
        Ok(TransactionStatusUpdate {
            status: body.status,
            status_code: body.status_code,
            error_message: body.error_message,
        })
    }

    /// Poll a transaction until it reaches a terminal status.
    ///
    /// Each status change (or failure) is sent once. Polling stops after a
    /// terminal status or failure, when the receiver is dropped, or when
    /// `shutdown` is cancelled. Fetch errors are logged and retried.
    pub fn watch_transaction(
        &self,
        id: TransactionId,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> mpsc::Receiver<TransactionStatusUpdate> {
        let (tx, rx) = mpsc::channel(STATUS_CHANNEL_CAPACITY);
        let client = self.clone();

        tokio::spawn(async move {
            info!(tx_id = %id, "Watching transaction");
            let mut last: Option<TransactionStatusUpdate> = None;

            loop {
                match client.transaction_result(&id).await {
                    Ok(update) => {
                        if last.as_ref() != Some(&update) {
                            debug!(tx_id = %id, status = ?update.status, "Transaction status changed");
                            let done = update.status.is_terminal() || update.failure().is_some();
                            if tx.send(update.clone()).await.is_err() {
                                debug!(tx_id = %id, "Status receiver dropped");
                                return;
                            }
                            if done {
                                return;
                            }
                            last = Some(update);
                        }
                    }
                    Err(e) => {
                        warn!(tx_id = %id, error = %e, "Transaction status poll failed, will retry");
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {},
                    _ = tx.closed() => return,
                    _ = shutdown.cancelled() => {
                        debug!(tx_id = %id, "Transaction watch cancelled");
                        return;
                    }
                }
            }
        });

        rx
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}
