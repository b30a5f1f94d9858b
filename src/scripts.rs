// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cadence Programs
//!
//! The three on-chain programs this client runs, and the contract address
//! resolution they need before they can be sent.
//!
//! | Program | Kind | Arguments |
//! |---------|------|-----------|
//! | `read-profile` | script | `address: Address` |
//! | `create-profile` | transaction | none |
//! | `update-profile` | transaction | `name`, `color`, `info` (all `String`) |
//!
//! Programs import contracts by name (`import "Profile"`). Before submission
//! each import is rewritten to `import Profile from 0x...` using
//! [`ContractAliases`], built from built-in defaults and, optionally, the
//! project's `flow.json`. Legacy `0xProfile` placeholders are replaced too.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::blockchain::{
    Address, CadenceArg, FlowNetwork, ProfileUpdate, Script, TransactionRequest,
};
use crate::error::ClientError;

const READ_PROFILE: &str = include_str!("../cadence/scripts/read-profile.cdc");
const CREATE_PROFILE: &str = include_str!("../cadence/transactions/create-profile.cdc");
const UPDATE_PROFILE: &str = include_str!("../cadence/transactions/update-profile.cdc");

/// Name of the profile contract imported by every program.
pub const PROFILE_CONTRACT: &str = "Profile";

/// Emulator service account, where local deployments land.
const EMULATOR_SERVICE_ACCOUNT: &str = "0xf8d6e0586b0a20c7";

/// Public profile contract on testnet.
const TESTNET_PROFILE_ADDRESS: &str = "0xba1132bc08f82fe2";

// =============================================================================
// flow.json
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct FlowJson {
    #[serde(default)]
    contracts: HashMap<String, ContractEntry>,
    #[serde(default)]
    accounts: HashMap<String, AccountEntry>,
    #[serde(default)]
    deployments: HashMap<String, HashMap<String, Vec<DeploymentEntry>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContractEntry {
    Detailed {
        #[serde(default)]
        aliases: HashMap<String, String>,
    },
    #[allow(dead_code)]
    Source(String),
}

#[derive(Debug, Deserialize)]
struct AccountEntry {
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeploymentEntry {
    Name(String),
    WithArgs { name: String },
}

impl DeploymentEntry {
    fn name(&self) -> &str {
        match self {
            DeploymentEntry::Name(name) | DeploymentEntry::WithArgs { name } => name,
        }
    }
}

// =============================================================================
// Contract aliases
// =============================================================================

/// Contract name → deployed address for one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAliases {
    aliases: HashMap<String, Address>,
}

impl ContractAliases {
    /// Built-in addresses of the profile contract.
    pub fn defaults(network: FlowNetwork) -> Self {
        let mut aliases = Self::default();
        match network {
            FlowNetwork::Emulator => aliases.insert(PROFILE_CONTRACT, EMULATOR_SERVICE_ACCOUNT),
            FlowNetwork::Testnet => aliases.insert(PROFILE_CONTRACT, TESTNET_PROFILE_ADDRESS),
            FlowNetwork::Mainnet => {}
        }
        aliases
    }

    /// Aliases declared in a `flow.json` document for `network`.
    ///
    /// Contract `aliases` entries are read first; contracts listed under
    /// `deployments` for the network take the deploying account's address.
    pub fn from_flow_json(raw: &str, network: FlowNetwork) -> Result<Self, ClientError> {
        let project: FlowJson = serde_json::from_str(raw)
            .map_err(|e| ClientError::Config(format!("invalid flow.json: {e}")))?;
        let key = network.as_str();
        let mut aliases = Self::default();

        for (name, entry) in &project.contracts {
            if let ContractEntry::Detailed { aliases: by_network } = entry {
                if let Some(address) = by_network.get(key) {
                    aliases.insert(name, address.as_str());
                }
            }
        }

        if let Some(deployments) = project.deployments.get(key) {
            for (account, contracts) in deployments {
                let entry = project.accounts.get(account).ok_or_else(|| {
                    ClientError::Config(format!(
                        "flow.json deploys to unknown account `{account}`"
                    ))
                })?;
                for contract in contracts {
                    aliases.insert(contract.name(), entry.address.as_str());
                }
            }
        }

        Ok(aliases)
    }

    /// Load a `flow.json` file from disk.
    pub fn load(path: &Path, network: FlowNetwork) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_flow_json(&raw, network)
    }

    pub fn insert(&mut self, name: &str, address: impl Into<Address>) {
        self.aliases.insert(name.to_string(), address.into());
    }

    pub fn get(&self, name: &str) -> Option<&Address> {
        self.aliases.get(name)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(mut self, other: ContractAliases) -> Self {
        self.aliases.extend(other.aliases);
        self
    }

    /// Rewrite the imports of a Cadence program to concrete addresses.
    pub fn resolve(&self, cadence: &str) -> Result<String, ClientError> {
        let mut resolved = String::with_capacity(cadence.len());

        for line in cadence.lines() {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix("import \"") {
                Some(rest) => {
                    let name = rest.split('"').next().unwrap_or_default();
                    let address = self.get(name).ok_or_else(|| {
                        ClientError::Config(format!("no address configured for contract `{name}`"))
                    })?;
                    resolved.push_str(&format!("import {name} from {address}"));
                }
                None => resolved.push_str(line),
            }
            resolved.push('\n');
        }

        // Longest names first so `0xProfileV2` is not clobbered by `0xProfile`.
        let mut names: Vec<&String> = self.aliases.keys().collect();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        for name in names {
            resolved = resolved.replace(&format!("0x{name}"), self.aliases[name].as_str());
        }

        Ok(resolved)
    }
}

// =============================================================================
// Profile programs
// =============================================================================

/// Resolved profile programs, ready to be sent.
#[derive(Debug, Clone)]
pub struct ProfilePrograms {
    read_profile: String,
    create_profile: String,
    update_profile: String,
}

impl ProfilePrograms {
    pub fn resolve(aliases: &ContractAliases) -> Result<Self, ClientError> {
        let programs = Self {
            read_profile: aliases.resolve(READ_PROFILE)?,
            create_profile: aliases.resolve(CREATE_PROFILE)?,
            update_profile: aliases.resolve(UPDATE_PROFILE)?,
        };
        debug!(
            profile_contract = ?aliases.get(PROFILE_CONTRACT),
            "Resolved profile programs"
        );
        Ok(programs)
    }

    /// Programs resolved against the built-in addresses of `network`.
    pub fn for_network(network: FlowNetwork) -> Result<Self, ClientError> {
        Self::resolve(&ContractAliases::defaults(network))
    }

    pub fn read_profile(&self, address: &Address) -> Script {
        Script {
            cadence: self.read_profile.clone(),
            args: vec![CadenceArg::Address(address.clone())],
        }
    }

    pub fn create_profile(&self, compute_limit: u64) -> TransactionRequest {
        TransactionRequest {
            cadence: self.create_profile.clone(),
            args: Vec::new(),
            compute_limit,
        }
    }

    pub fn update_profile(&self, update: &ProfileUpdate, compute_limit: u64) -> TransactionRequest {
        TransactionRequest {
            cadence: self.update_profile.clone(),
            args: vec![
                CadenceArg::String(update.name.clone()),
                CadenceArg::String(update.color.clone()),
                CadenceArg::String(update.info.clone()),
            ],
            compute_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FLOW_JSON: &str = r#"{
        "contracts": {
            "Profile": {
                "source": "./cadence/contracts/Profile.cdc",
                "aliases": { "testnet": "0xba1132bc08f82fe2" }
            },
            "Other": "./cadence/contracts/Other.cdc"
        },
        "networks": { "emulator": "127.0.0.1:3569" },
        "accounts": {
            "emulator-account": { "address": "f8d6e0586b0a20c7", "key": "deadbeef" }
        },
        "deployments": {
            "emulator": { "emulator-account": ["Profile", { "name": "Other", "args": [] }] }
        }
    }"#;

    #[test]
    fn resolves_string_imports() {
        let programs = ProfilePrograms::for_network(FlowNetwork::Testnet).unwrap();
        let script = programs.read_profile(&Address::from("0x01"));
        assert!(script
            .cadence
            .starts_with("import Profile from 0xba1132bc08f82fe2\n"));
        assert_eq!(script.args, vec![CadenceArg::Address(Address::from("0x01"))]);
    }

    #[test]
    fn missing_alias_is_config_error() {
        let err = ProfilePrograms::for_network(FlowNetwork::Mainnet).unwrap_err();
        assert_eq!(err.error_code(), "config_error");
        assert!(err.to_string().contains("Profile"));
    }

    #[test]
    fn replaces_legacy_placeholders() {
        let mut aliases = ContractAliases::default();
        aliases.insert("Profile", "0x01");
        aliases.insert("ProfileV2", "0x02");
        let out = aliases
            .resolve("import Profile from 0xProfile\nimport ProfileV2 from 0xProfileV2")
            .unwrap();
        assert_eq!(
            out,
            "import Profile from 0x0000000000000001\nimport ProfileV2 from 0x0000000000000002\n"
        );
    }

    #[test]
    fn flow_json_aliases_and_deployments() {
        let testnet = ContractAliases::from_flow_json(FLOW_JSON, FlowNetwork::Testnet).unwrap();
        assert_eq!(testnet.get("Profile"), Some(&Address::from("0xba1132bc08f82fe2")));
        assert_eq!(testnet.get("Other"), None);

        let emulator = ContractAliases::from_flow_json(FLOW_JSON, FlowNetwork::Emulator).unwrap();
        assert_eq!(emulator.get("Profile"), Some(&Address::from("0xf8d6e0586b0a20c7")));
        assert_eq!(emulator.get("Other"), Some(&Address::from("0xf8d6e0586b0a20c7")));
    }

    #[test]
    fn flow_json_loads_from_disk_and_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"contracts": {"Profile": {"source": "x", "aliases": {"testnet": "0xabc"}}}}"#,
        )
        .unwrap();

        let loaded = ContractAliases::load(file.path(), FlowNetwork::Testnet).unwrap();
        let merged = ContractAliases::defaults(FlowNetwork::Testnet).merge(loaded);
        assert_eq!(merged.get("Profile"), Some(&Address::from("0xabc")));
    }

    #[test]
    fn update_profile_arguments_in_order() {
        let programs = ProfilePrograms::for_network(FlowNetwork::Emulator).unwrap();
        let update = ProfileUpdate {
            name: "x".into(),
            color: "y".into(),
            info: "z".into(),
        };
        let request = programs.update_profile(&update, 50);
        assert_eq!(
            request.args,
            vec![
                CadenceArg::String("x".into()),
                CadenceArg::String("y".into()),
                CadenceArg::String("z".into()),
            ]
        );
        assert_eq!(request.compute_limit, 50);
        assert!(programs.create_profile(50).args.is_empty());
    }
}
