// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction state of the most recent profile transaction.
//!
//! Holds a single live record, overwritten by each submission. Observers
//! receive every change through a `watch` channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::blockchain::{TransactionId, TransactionStatus};

/// Id and last known status of the latest transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionState {
    pub id: Option<TransactionId>,
    pub status: Option<TransactionStatus>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Single-writer store for [`TransactionState`]. Last write wins.
pub struct TransactionStateStore {
    state: watch::Sender<TransactionState>,
}

impl TransactionStateStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TransactionState::default());
        Self { state }
    }

    /// Clear id, status and timestamp.
    pub fn initialize(&self) {
        self.state.send_replace(TransactionState::default());
    }

    /// Record the id of a freshly submitted transaction.
    pub fn set_id(&self, id: TransactionId) {
        self.state.send_modify(|state| {
            state.id = Some(id);
            state.submitted_at = Some(Utc::now());
        });
    }

    pub fn set_status(&self, status: TransactionStatus) {
        self.state.send_modify(|state| state.status = Some(status));
    }

    pub fn snapshot(&self) -> TransactionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.state.subscribe()
    }
}

impl Default for TransactionStateStore {
    fn default() -> Self {
        Self::new()
    }
}
