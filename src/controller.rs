// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session / Profile Controller
//!
//! Keeps application state in sync with the wallet session and the on-chain
//! profile.
//!
//! ## State Machine
//!
//! ```text
//!               session(logged_in)            profile found
//!  LoggedOut ─────────────────────▶ LoggedInNoProfile ──────────▶ LoggedInWithProfile
//!      ▲                                   │                              │
//!      └───────────── log_out / session(logged_out) ─────────────────────┘
//! ```
//!
//! - A logged-in session with no cached profile triggers one profile load.
//! - `create_profile` / `update_profile` submit a transaction and track its
//!   status stream; once sealed, the profile is reloaded.
//! - Only one profile transaction may be in flight per controller.
//!
//! Observers call [`ProfileController::subscribe`] and re-render on change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::{
    ChainAdapter, Profile, ProfileUpdate, Session, TransactionId, TransactionRequest,
    TransactionStatus, TransactionStatusUpdate,
};
use crate::config::{AppConfig, DEFAULT_COMPUTE_LIMIT, DEFAULT_SEAL_TIMEOUT};
use crate::error::ClientError;
use crate::scripts::ProfilePrograms;
use crate::tx_state::{TransactionState, TransactionStateStore};

/// Coarse phase derived from session and profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    LoggedOut,
    LoggedInNoProfile,
    LoggedInWithProfile,
}

/// Snapshot published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileState {
    pub session: Session,
    pub profile: Option<Profile>,
}

impl ProfileState {
    pub fn profile_exists(&self) -> bool {
        self.profile.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.session.logged_in, &self.profile) {
            (false, _) => SessionPhase::LoggedOut,
            (true, None) => SessionPhase::LoggedInNoProfile,
            (true, Some(_)) => SessionPhase::LoggedInWithProfile,
        }
    }
}

/// Tunables for transaction submission and tracking.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub compute_limit: u64,
    /// Maximum time between submission and a terminal status.
    pub seal_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            compute_limit: DEFAULT_COMPUTE_LIMIT,
            seal_timeout: DEFAULT_SEAL_TIMEOUT,
        }
    }
}

impl From<&AppConfig> for ControllerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            compute_limit: config.compute_limit,
            seal_timeout: config.seal_timeout,
        }
    }
}

/// A submitted transaction whose status is being tracked.
///
/// Dropping the handle does not stop tracking.
#[derive(Debug)]
pub struct PendingTransaction {
    id: TransactionId,
    handle: JoinHandle<Result<TransactionStatus, ClientError>>,
}

impl PendingTransaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Wait for the terminal outcome (and the profile reload on success).
    pub async fn outcome(self) -> Result<TransactionStatus, ClientError> {
        self.handle
            .await
            .map_err(|e| ClientError::Internal(format!("transaction tracker failed: {e}")))?
    }
}

struct Inner {
    adapter: Arc<dyn ChainAdapter>,
    programs: ProfilePrograms,
    options: ControllerOptions,
    state: watch::Sender<ProfileState>,
    transactions: TransactionStateStore,
    in_flight: AtomicBool,
}

/// Releases the single-flight slot when the tracker (or a failed submit) ends.
struct InFlightGuard {
    inner: Arc<Inner>,
}

impl InFlightGuard {
    fn acquire(inner: &Arc<Inner>) -> Result<Self, ClientError> {
        inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::TransactionInFlight)?;
        Ok(Self {
            inner: Arc::clone(inner),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.store(false, Ordering::Release);
    }
}

/// Session/profile controller. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ProfileController {
    inner: Arc<Inner>,
}

impl ProfileController {
    pub fn new(
        adapter: Arc<dyn ChainAdapter>,
        programs: ProfilePrograms,
        options: ControllerOptions,
    ) -> Self {
        let (state, _) = watch::channel(ProfileState::default());
        Self {
            inner: Arc::new(Inner {
                adapter,
                programs,
                options,
                state,
                transactions: TransactionStateStore::new(),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> ProfileState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.inner.transactions.snapshot()
    }

    pub fn subscribe_transactions(&self) -> watch::Receiver<TransactionState> {
        self.inner.transactions.subscribe()
    }

    /// Whether a profile transaction is currently being tracked.
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Follow the adapter's session notifications until `shutdown` fires.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(controller.clone().run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        let mut sessions = self.inner.adapter.subscribe_session();
        info!("Session listener starting");

        loop {
            let session = sessions.borrow_and_update().clone();
            if let Err(e) = self.handle_session(session).await {
                warn!(error = %e, code = e.error_code(), "Profile load after session change failed");
            }

            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        info!("Session source closed, listener stopping");
                        return;
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Session listener shutting down");
                    return;
                }
            }
        }
    }

    /// Apply a session notification.
    ///
    /// The cached profile is dropped on logout or account switch. A
    /// logged-in session without a cached profile loads it.
    pub async fn handle_session(&self, session: Session) -> Result<(), ClientError> {
        debug!(logged_in = session.logged_in, address = ?session.address, "Session changed");

        let mut needs_load = false;
        self.inner.state.send_modify(|state| {
            if !session.logged_in || session.address != state.session.address {
                state.profile = None;
            }
            state.session = session;
            needs_load = state.session.logged_in && state.profile.is_none();
        });

        if needs_load {
            self.load_profile().await?;
        }
        Ok(())
    }

    /// Start the wallet login flow. State changes arrive via the session.
    pub async fn log_in(&self) -> Result<(), ClientError> {
        self.inner.adapter.log_in().await
    }

    /// Start the wallet sign-up flow. State changes arrive via the session.
    pub async fn sign_up(&self) -> Result<(), ClientError> {
        self.inner.adapter.sign_up().await
    }

    /// End the wallet session and clear local state, even if the wallet
    /// reports an error (which is returned afterwards).
    pub async fn log_out(&self) -> Result<(), ClientError> {
        let result = self.inner.adapter.unauthenticate().await;

        self.inner.state.send_modify(|state| {
            state.session = Session::logged_out();
            state.profile = None;
        });

        match &result {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Wallet unauthenticate failed, local session cleared"),
        }
        result
    }

    // -------------------------------------------------------------------------
    // Profile
    // -------------------------------------------------------------------------

    /// Read the profile of the session's account and cache it.
    ///
    /// Fails with [`ClientError::MissingAddress`] when the session has no
    /// address. A result for an account that is no longer the session's is
    /// returned but not cached.
    pub async fn load_profile(&self) -> Result<Option<Profile>, ClientError> {
        let address = self.inner.state.borrow().session.address.clone();
        let address = address.ok_or(ClientError::MissingAddress)?;

        let script = self.inner.programs.read_profile(&address);
        let value = self.inner.adapter.query(script).await?;
        let profile: Option<Profile> = serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("unexpected profile shape: {e}")))?;

        let applied = self.inner.state.send_if_modified(|state| {
            if state.session.address.as_ref() != Some(&address) {
                return false;
            }
            state.profile = profile.clone();
            true
        });

        if applied {
            debug!(%address, exists = profile.is_some(), "Profile loaded");
        } else {
            debug!(%address, "Session changed during profile load, result discarded");
        }
        Ok(profile)
    }

    /// Submit the create-profile transaction.
    pub async fn create_profile(&self) -> Result<PendingTransaction, ClientError> {
        let request = self
            .inner
            .programs
            .create_profile(self.inner.options.compute_limit);
        self.submit("create_profile", request).await
    }

    /// Submit the update-profile transaction.
    pub async fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> Result<PendingTransaction, ClientError> {
        debug!(
            name = %update.name,
            color = %update.color,
            info = %update.info,
            "Updating profile"
        );
        let request = self
            .inner
            .programs
            .update_profile(&update, self.inner.options.compute_limit);
        self.submit("update_profile", request).await
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    async fn submit(
        &self,
        kind: &'static str,
        request: TransactionRequest,
    ) -> Result<PendingTransaction, ClientError> {
        let guard = InFlightGuard::acquire(&self.inner)?;

        self.inner.transactions.initialize();
        let id = self.inner.adapter.mutate(request).await?;
        self.inner.transactions.set_id(id.clone());
        info!(tx_id = %id, kind, "Transaction submitted");

        // Held until the outcome is known, even if the status stream never opens.
        let controller = self.clone();
        let tracked = id.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let updates = match controller.inner.adapter.transaction_updates(&tracked).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(tx_id = %tracked, error = %e, "Cannot follow transaction status");
                    return Err(e);
                }
            };
            controller.track(tracked, updates).await
        });

        Ok(PendingTransaction { id, handle })
    }

    async fn track(
        &self,
        id: TransactionId,
        mut updates: mpsc::Receiver<TransactionStatusUpdate>,
    ) -> Result<TransactionStatus, ClientError> {
        let deadline = tokio::time::sleep(self.inner.options.seal_timeout);
        tokio::pin!(deadline);

        loop {
            let update = tokio::select! {
                update = updates.recv() => update,
                _ = &mut deadline => {
                    warn!(tx_id = %id, "Transaction not sealed before timeout");
                    return Err(ClientError::TransactionTimedOut { id });
                }
            };

            let Some(update) = update else {
                warn!(tx_id = %id, "Transaction status stream ended before a terminal status");
                return Err(ClientError::Transport(format!(
                    "status stream for {id} closed before a terminal status"
                )));
            };

            self.inner.transactions.set_status(update.status);

            if let Some(message) = update.failure() {
                warn!(tx_id = %id, status = ?update.status, %message, "Transaction failed");
                return Err(ClientError::TransactionRejected { id, message });
            }

            match update.status {
                TransactionStatus::Sealed => {
                    info!(tx_id = %id, "Transaction sealed");
                    let logged_in = self.inner.state.borrow().session.logged_in;
                    if logged_in {
                        self.load_profile().await?;
                    } else {
                        debug!(tx_id = %id, "Session ended before seal, skipping profile reload");
                    }
                    return Ok(TransactionStatus::Sealed);
                }
                TransactionStatus::Expired => {
                    warn!(tx_id = %id, "Transaction expired");
                    return Err(ClientError::TransactionRejected {
                        id,
                        message: "transaction expired".to_string(),
                    });
                }
                status => debug!(tx_id = %id, ?status, "Transaction status update"),
            }
        }
    }
}
