// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client error type.
//!
//! Every fallible operation of the crate returns [`ClientError`]. An absent
//! profile is not an error: it is reported as `Ok(None)`.

use crate::blockchain::TransactionId;

/// Errors surfaced by the session/profile client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Wallet authentication or session handling failed.
    #[error("Session error: {0}")]
    Session(String),

    /// A read-only script execution failed.
    #[error("Query error: {0}")]
    Query(String),

    /// The access node could not be reached or answered unexpectedly.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A chain response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The transaction was rejected, failed execution or expired.
    #[error("Transaction {id} rejected: {message}")]
    TransactionRejected { id: TransactionId, message: String },

    /// The transaction did not reach a terminal status in time.
    #[error("Transaction {id} was not sealed in time")]
    TransactionTimedOut { id: TransactionId },

    /// Another profile transaction is still being tracked.
    #[error("A profile transaction is already in flight")]
    TransactionInFlight,

    /// The current session carries no account address.
    #[error("No account address in the current session")]
    MissingAddress,

    /// Invalid configuration or project file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A background task failed unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Session(_) => "session_error",
            ClientError::Query(_) => "query_error",
            ClientError::Transport(_) => "transport_error",
            ClientError::Decode(_) => "decode_error",
            ClientError::TransactionRejected { .. } => "transaction_rejected",
            ClientError::TransactionTimedOut { .. } => "transaction_timed_out",
            ClientError::TransactionInFlight => "transaction_in_flight",
            ClientError::MissingAddress => "missing_address",
            ClientError::Config(_) => "config_error",
            ClientError::Internal(_) => "internal_error",
        }
    }

    /// Whether the error concerns a submitted transaction's outcome.
    pub fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            ClientError::TransactionRejected { .. } | ClientError::TransactionTimedOut { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
