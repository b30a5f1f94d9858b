// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provider seam and the composed Flow adapter.
//!
//! Authentication and signing belong to the user's wallet and are reached
//! through [`WalletProvider`]. [`FlowAdapter`] combines a wallet with the
//! access node reader and owns the session channel the controller
//! subscribes to.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use super::adapter::ChainAdapter;
use super::client::AccessNodeClient;
use super::types::{
    Address, Script, Session, TransactionId, TransactionRequest, TransactionStatusUpdate,
};
use crate::error::ClientError;

/// Wallet-side operations: discovery, authentication and signing.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Authenticate through the discovery service, returning the account.
    async fn authenticate(&self, discovery: &Url) -> Result<Address, ClientError>;

    /// Create an account through the discovery service and authenticate it.
    async fn sign_up(&self, discovery: &Url) -> Result<Address, ClientError>;

    async fn unauthenticate(&self) -> Result<(), ClientError>;

    /// Sign (as payer, proposer and authorizer) and send a transaction.
    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionId, ClientError>;
}

/// [`ChainAdapter`] backed by a wallet provider and an access node.
pub struct FlowAdapter<W> {
    wallet: W,
    reader: AccessNodeClient,
    discovery: Url,
    session: watch::Sender<Session>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl<W: WalletProvider> FlowAdapter<W> {
    pub fn new(wallet: W, reader: AccessNodeClient, discovery: Url, poll_interval: Duration) -> Self {
        let (session, _) = watch::channel(Session::logged_out());
        Self {
            wallet,
            reader,
            discovery,
            session,
            poll_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Stop all transaction watchers started by this adapter.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl<W: WalletProvider> ChainAdapter for FlowAdapter<W> {
    fn subscribe_session(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    async fn query(&self, script: Script) -> Result<Value, ClientError> {
        let value = self.reader.execute_script(&script).await?;
        Ok(value.to_json())
    }

    async fn mutate(&self, request: TransactionRequest) -> Result<TransactionId, ClientError> {
        let logged_in = self.session.borrow().logged_in;
        if !logged_in {
            return Err(ClientError::Session("wallet is not authenticated".to_string()));
        }
        self.wallet.send_transaction(&request).await
    }

    async fn transaction_updates(
        &self,
        id: &TransactionId,
    ) -> Result<mpsc::Receiver<TransactionStatusUpdate>, ClientError> {
        Ok(self
            .reader
            .watch_transaction(id.clone(), self.poll_interval, self.shutdown.child_token()))
    }

    async fn log_in(&self) -> Result<(), ClientError> {
        let address = self.wallet.authenticate(&self.discovery).await?;
        info!(%address, "Wallet authenticated");
        self.session.send_replace(Session::logged_in(address));
        Ok(())
    }

    async fn sign_up(&self) -> Result<(), ClientError> {
        let address = self.wallet.sign_up(&self.discovery).await?;
        info!(%address, "Wallet account created");
        self.session.send_replace(Session::logged_in(address));
        Ok(())
    }

    async fn unauthenticate(&self) -> Result<(), ClientError> {
        let result = self.wallet.unauthenticate().await;
        if let Err(e) = &result {
            warn!(error = %e, "Wallet unauthenticate failed, clearing session anyway");
        }
        self.session.send_replace(Session::logged_out());
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeWallet {
        fail_unauthenticate: bool,
        sent: Mutex<Vec<TransactionRequest>>,
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        async fn authenticate(&self, _discovery: &Url) -> Result<Address, ClientError> {
            Ok(Address::from("0x01"))
        }

        async fn sign_up(&self, _discovery: &Url) -> Result<Address, ClientError> {
            Ok(Address::from("0x02"))
        }

        async fn unauthenticate(&self) -> Result<(), ClientError> {
            if self.fail_unauthenticate {
                Err(ClientError::Session("wallet unreachable".into()))
            } else {
                Ok(())
            }
        }

        async fn send_transaction(
            &self,
            request: &TransactionRequest,
        ) -> Result<TransactionId, ClientError> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(TransactionId::from("tx123"))
        }
    }

    fn adapter(wallet: FakeWallet) -> FlowAdapter<FakeWallet> {
        FlowAdapter::new(
            wallet,
            AccessNodeClient::new("http://127.0.0.1:1".parse().unwrap(), Duration::from_secs(1))
                .unwrap(),
            "http://localhost:8701/fcl/authn".parse().unwrap(),
            Duration::from_millis(10),
        )
    }

    fn request() -> TransactionRequest {
        TransactionRequest {
            cadence: "transaction {}".into(),
            args: vec![],
            compute_limit: 50,
        }
    }

    #[tokio::test]
    async fn log_in_publishes_session() {
        let adapter = adapter(FakeWallet::default());
        let mut sessions = adapter.subscribe_session();
        assert!(!sessions.borrow_and_update().logged_in);

        adapter.log_in().await.unwrap();
        sessions.changed().await.unwrap();
        assert_eq!(*sessions.borrow(), Session::logged_in("0x01"));

        adapter.sign_up().await.unwrap();
        assert_eq!(adapter.session(), Session::logged_in("0x02"));
    }

    #[tokio::test]
    async fn mutate_requires_authenticated_wallet() {
        let adapter = adapter(FakeWallet::default());
        let err = adapter.mutate(request()).await.unwrap_err();
        assert_eq!(err.error_code(), "session_error");

        adapter.log_in().await.unwrap();
        let id = adapter.mutate(request()).await.unwrap();
        assert_eq!(id, TransactionId::from("tx123"));
        assert_eq!(adapter.wallet.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unauthenticate_clears_session_even_on_wallet_error() {
        let adapter = adapter(FakeWallet {
            fail_unauthenticate: true,
            ..FakeWallet::default()
        });
        adapter.log_in().await.unwrap();

        assert!(adapter.unauthenticate().await.is_err());
        assert_eq!(adapter.session(), Session::logged_out());
    }
}
