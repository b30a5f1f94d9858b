// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain client adapter contract.
//!
//! The controller never talks to a wallet or an access node directly; it
//! depends on this trait so the session source and transaction streams can
//! be injected (and faked in tests).

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use super::types::{Script, Session, TransactionId, TransactionRequest, TransactionStatusUpdate};
use crate::error::ClientError;

#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Session notifications. The receiver holds the current session
    /// immediately and is updated on every change.
    fn subscribe_session(&self) -> watch::Receiver<Session>;

    /// Execute a read-only script and return its result as plain JSON
    /// (`null` for an empty optional).
    async fn query(&self, script: Script) -> Result<Value, ClientError>;

    /// Submit a transaction authorized by the current wallet.
    async fn mutate(&self, request: TransactionRequest) -> Result<TransactionId, ClientError>;

    /// Status stream of a submitted transaction, in increasing status order.
    /// The stream ends after a terminal status.
    async fn transaction_updates(
        &self,
        id: &TransactionId,
    ) -> Result<mpsc::Receiver<TransactionStatusUpdate>, ClientError>;

    /// Start the wallet discovery / authentication flow.
    async fn log_in(&self) -> Result<(), ClientError>;

    /// Start the wallet sign-up flow.
    async fn sign_up(&self) -> Result<(), ClientError>;

    /// End the wallet session.
    async fn unauthenticate(&self) -> Result<(), ClientError>;
}
