// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flow chain types and network constants.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cadence::CadenceArg;
use crate::error::ClientError;

// =============================================================================
// Networks
// =============================================================================

/// Flow network endpoints.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Access node REST endpoint
    pub access_node_url: &'static str,
    /// Wallet discovery endpoint
    pub discovery_wallet_url: &'static str,
}

/// Local Flow emulator with the dev wallet.
pub const FLOW_EMULATOR: NetworkConfig = NetworkConfig {
    name: "emulator",
    access_node_url: "http://127.0.0.1:8888",
    discovery_wallet_url: "http://localhost:8701/fcl/authn",
};

/// Flow testnet.
pub const FLOW_TESTNET: NetworkConfig = NetworkConfig {
    name: "testnet",
    access_node_url: "https://rest-testnet.onflow.org",
    discovery_wallet_url: "https://fcl-discovery.onflow.org/testnet/authn",
};

/// Flow mainnet.
pub const FLOW_MAINNET: NetworkConfig = NetworkConfig {
    name: "mainnet",
    access_node_url: "https://rest-mainnet.onflow.org",
    discovery_wallet_url: "https://fcl-discovery.onflow.org/authn",
};

/// Network selector used for configuration and contract alias lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowNetwork {
    Emulator,
    Testnet,
    Mainnet,
}

impl FlowNetwork {
    /// Default endpoints for this network.
    pub fn config(self) -> NetworkConfig {
        match self {
            FlowNetwork::Emulator => FLOW_EMULATOR,
            FlowNetwork::Testnet => FLOW_TESTNET,
            FlowNetwork::Mainnet => FLOW_MAINNET,
        }
    }

    /// Key used for this network in `flow.json`.
    pub fn as_str(self) -> &'static str {
        self.config().name
    }
}

impl FromStr for FlowNetwork {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "emulator" | "local" => Ok(FlowNetwork::Emulator),
            "testnet" => Ok(FlowNetwork::Testnet),
            "mainnet" => Ok(FlowNetwork::Mainnet),
            other => Err(ClientError::Config(format!(
                "unknown Flow network `{other}` (expected emulator, testnet or mainnet)"
            ))),
        }
    }
}

impl std::fmt::Display for FlowNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Accounts & Session
// =============================================================================

/// Flow account address, stored as `0x` plus 16 lowercase hex digits.
///
/// Short forms are left-padded with zeros:
///
/// ```rust,ignore
/// assert_eq!(Address::from("0x1").as_str(), "0x0000000000000001");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        let hex = value.trim().trim_start_matches("0x").to_ascii_lowercase();
        Address(format!("0x{hex:0>16}"))
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address::from(value.to_string())
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Strict parsing: at most 16 hex digits after an optional `0x`.
impl FromStr for Address {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let hex = raw.trim().trim_start_matches("0x");
        if hex.is_empty() || hex.len() > 16 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ClientError::Config(format!("invalid Flow address `{raw}`")));
        }
        Ok(Address::from(hex))
    }
}

/// Wallet session as reported by the chain adapter.
///
/// Replaced wholesale on every notification, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    pub address: Option<Address>,
}

impl Session {
    pub fn logged_in(address: impl Into<Address>) -> Self {
        Self {
            logged_in: true,
            address: Some(address.into()),
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }
}

// =============================================================================
// Profile
// =============================================================================

/// On-chain profile as returned by the read-profile script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub color: String,
    pub info: String,
}

/// Input of the update-profile transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub color: String,
    pub info: String,
}

impl From<Profile> for ProfileUpdate {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            color: profile.color,
            info: profile.info,
        }
    }
}

// =============================================================================
// Scripts & Transactions
// =============================================================================

/// A read-only Cadence script with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub cadence: String,
    pub args: Vec<CadenceArg>,
}

/// A mutating Cadence transaction.
///
/// The connected wallet acts as payer, proposer and sole authorizer; the
/// request only carries what differs between transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub cadence: String,
    pub args: Vec<CadenceArg>,
    /// Compute (gas) limit
    pub compute_limit: u64,
}

/// Transaction identifier (hex hash) returned on submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        TransactionId(value)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        TransactionId(value.to_string())
    }
}

/// Flow transaction lifecycle status.
///
/// Discriminants match the numeric codes used by Flow clients. Statuses are
/// delivered in increasing order; `Sealed` and `Expired` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TransactionStatus {
    Pending = 1,
    Finalized = 2,
    Executed = 3,
    Sealed = 4,
    Expired = 5,
    #[default]
    #[serde(other)]
    Unknown = 0,
}

impl TransactionStatus {
    /// Map a numeric status code; unrecognized codes become `Unknown`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => TransactionStatus::Pending,
            2 => TransactionStatus::Finalized,
            3 => TransactionStatus::Executed,
            4 => TransactionStatus::Sealed,
            5 => TransactionStatus::Expired,
            _ => TransactionStatus::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Sealed | TransactionStatus::Expired)
    }
}

/// One notification from a transaction's status stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatusUpdate {
    pub status: TransactionStatus,
    /// Execution result code, non-zero on failure
    #[serde(default)]
    pub status_code: u32,
    #[serde(default)]
    pub error_message: String,
}

impl TransactionStatusUpdate {
    /// A successful update with the given status.
    pub fn new(status: TransactionStatus) -> Self {
        Self {
            status,
            status_code: 0,
            error_message: String::new(),
        }
    }

    /// Execution failure reported by the chain, if any.
    pub fn failure(&self) -> Option<String> {
        if !self.error_message.is_empty() {
            Some(self.error_message.clone())
        } else if self.status_code != 0 {
            Some(format!("execution failed with status code {}", self.status_code))
        } else {
            None
        }
    }
}
