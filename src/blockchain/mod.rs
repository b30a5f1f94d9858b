// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flow blockchain integration.
//!
//! This module provides:
//! - The [`ChainAdapter`] contract the controller depends on
//! - JSON-Cadence argument/result encoding
//! - An access node REST reader (scripts, transaction results)
//! - The wallet provider seam and the composed [`FlowAdapter`]

pub mod adapter;
pub mod cadence;
pub mod client;
pub mod types;
pub mod wallet;

pub use adapter::ChainAdapter;
pub use cadence::{CadenceArg, CadenceValue};
pub use client::AccessNodeClient;
pub use types::*;
pub use wallet::{FlowAdapter, WalletProvider};
