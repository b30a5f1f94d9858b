// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flow Profile - Wallet Session & Profile Client
//!
//! This crate keeps application state in sync with a Flow wallet session:
//! it loads the user's on-chain `Profile`, submits the create/update profile
//! transactions and refreshes the profile once they are sealed.
//!
//! ## Modules
//!
//! - `blockchain` - Chain adapter contract, JSON-Cadence, access node reader
//! - `controller` - Session/profile state machine
//! - `tx_state` - Latest transaction id and status
//! - `scripts` - Cadence programs and contract address resolution
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod blockchain;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod scripts;
pub mod tx_state;

pub use controller::{
    ControllerOptions, PendingTransaction, ProfileController, ProfileState, SessionPhase,
};
pub use error::ClientError;
