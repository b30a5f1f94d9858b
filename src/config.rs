// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `FLOW_APP_TITLE` | App title shown by wallets | `Flow Profile` |
//! | `FLOW_APP_ICON` | App icon URL | none |
//! | `FLOW_NETWORK` | `emulator`, `testnet` or `mainnet` | `testnet` |
//! | `FLOW_ACCESS_NODE_API` | Access node REST endpoint | network default |
//! | `FLOW_DISCOVERY_WALLET` | Wallet discovery endpoint | network default |
//! | `FLOW_JSON_PATH` | `flow.json` with contract aliases | none |
//! | `FLOW_COMPUTE_LIMIT` | Transaction compute limit | `50` |
//! | `FLOW_TX_POLL_MS` | Transaction status poll interval | `1000` |
//! | `FLOW_SEAL_TIMEOUT_SECS` | Give up waiting for a seal after | `300` |
//! | `FLOW_HTTP_TIMEOUT_SECS` | Per-request access node timeout | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::blockchain::FlowNetwork;
use crate::error::ClientError;
use crate::scripts::ContractAliases;

pub const APP_TITLE_ENV: &str = "FLOW_APP_TITLE";
pub const APP_ICON_ENV: &str = "FLOW_APP_ICON";
pub const NETWORK_ENV: &str = "FLOW_NETWORK";
pub const ACCESS_NODE_ENV: &str = "FLOW_ACCESS_NODE_API";
pub const DISCOVERY_WALLET_ENV: &str = "FLOW_DISCOVERY_WALLET";
pub const FLOW_JSON_ENV: &str = "FLOW_JSON_PATH";
pub const COMPUTE_LIMIT_ENV: &str = "FLOW_COMPUTE_LIMIT";
pub const TX_POLL_ENV: &str = "FLOW_TX_POLL_MS";
pub const SEAL_TIMEOUT_ENV: &str = "FLOW_SEAL_TIMEOUT_SECS";
pub const HTTP_TIMEOUT_ENV: &str = "FLOW_HTTP_TIMEOUT_SECS";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_APP_TITLE: &str = "Flow Profile";

/// Compute limit applied to the profile transactions.
pub const DEFAULT_COMPUTE_LIMIT: u64 = 50;

pub const DEFAULT_TX_POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub const DEFAULT_SEAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Upper bound on a single access node request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ClientError::Config(format!("unknown log format `{other}`"))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_title: String,
    pub app_icon: Option<Url>,
    pub network: FlowNetwork,
    pub access_node_api: Url,
    pub discovery_wallet: Url,
    pub flow_json_path: Option<PathBuf>,
    pub compute_limit: u64,
    pub tx_poll_interval: Duration,
    pub seal_timeout: Duration,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let network = match var(NETWORK_ENV) {
            Some(raw) => raw.parse()?,
            None => FlowNetwork::Testnet,
        };
        let defaults = network.config();

        let access_node_api = parse_url(
            ACCESS_NODE_ENV,
            &var(ACCESS_NODE_ENV).unwrap_or_else(|| defaults.access_node_url.to_string()),
        )?;
        let discovery_wallet = parse_url(
            DISCOVERY_WALLET_ENV,
            &var(DISCOVERY_WALLET_ENV).unwrap_or_else(|| defaults.discovery_wallet_url.to_string()),
        )?;
        let app_icon = var(APP_ICON_ENV)
            .map(|raw| parse_url(APP_ICON_ENV, &raw))
            .transpose()?;

        let compute_limit = parse_number(COMPUTE_LIMIT_ENV, var(COMPUTE_LIMIT_ENV))?
            .unwrap_or(DEFAULT_COMPUTE_LIMIT);
        let tx_poll_interval = parse_number(TX_POLL_ENV, var(TX_POLL_ENV))?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TX_POLL_INTERVAL);
        let seal_timeout = parse_number(SEAL_TIMEOUT_ENV, var(SEAL_TIMEOUT_ENV))?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEAL_TIMEOUT);
        let http_timeout = match parse_number(HTTP_TIMEOUT_ENV, var(HTTP_TIMEOUT_ENV))? {
            Some(0) => {
                return Err(ClientError::Config(format!(
                    "{HTTP_TIMEOUT_ENV}: timeout must be at least one second"
                )))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            app_title: var(APP_TITLE_ENV).unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
            app_icon,
            network,
            access_node_api,
            discovery_wallet,
            flow_json_path: var(FLOW_JSON_ENV).map(PathBuf::from),
            compute_limit,
            tx_poll_interval,
            seal_timeout,
            http_timeout,
            log_format,
        })
    }

    /// Contract aliases: built-in defaults overlaid with `flow.json`.
    pub fn contract_aliases(&self) -> Result<ContractAliases, ClientError> {
        let defaults = ContractAliases::defaults(self.network);
        match &self.flow_json_path {
            Some(path) => Ok(defaults.merge(ContractAliases::load(path, self.network)?)),
            None => Ok(defaults),
        }
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ClientError> {
    raw.parse()
        .map_err(|e: url::ParseError| ClientError::Config(format!("{key}: invalid URL `{raw}`: {e}")))
}

fn parse_number(key: &str, raw: Option<String>) -> Result<Option<u64>, ClientError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ClientError::Config(format!("{key}: invalid number `{value}`: {e}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ClientError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_target_testnet() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.network, FlowNetwork::Testnet);
        assert_eq!(config.access_node_api.as_str(), "https://rest-testnet.onflow.org/");
        assert_eq!(config.compute_limit, DEFAULT_COMPUTE_LIMIT);
        assert_eq!(config.seal_timeout, DEFAULT_SEAL_TIMEOUT);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.app_title, DEFAULT_APP_TITLE);
        assert!(config.app_icon.is_none());
    }

    #[test]
    fn network_selects_endpoint_defaults() {
        let config = config_from(&[(NETWORK_ENV, "emulator")]).unwrap();
        assert_eq!(config.access_node_api.as_str(), "http://127.0.0.1:8888/");
        assert_eq!(config.discovery_wallet.as_str(), "http://localhost:8701/fcl/authn");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (ACCESS_NODE_ENV, "http://localhost:9999"),
            (COMPUTE_LIMIT_ENV, "999"),
            (TX_POLL_ENV, "250"),
            (SEAL_TIMEOUT_ENV, "10"),
            (HTTP_TIMEOUT_ENV, "5"),
            (LOG_FORMAT_ENV, "json"),
            (APP_ICON_ENV, "https://unavatar.io/twitter/muttonia"),
        ])
        .unwrap();
        assert_eq!(config.access_node_api.as_str(), "http://localhost:9999/");
        assert_eq!(config.compute_limit, 999);
        assert_eq!(config.tx_poll_interval, Duration::from_millis(250));
        assert_eq!(config.seal_timeout, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.app_icon.is_some());
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(config_from(&[(NETWORK_ENV, "devnet")]).is_err());
        assert!(config_from(&[(COMPUTE_LIMIT_ENV, "lots")]).is_err());
        assert!(config_from(&[(ACCESS_NODE_ENV, "not a url")]).is_err());
        assert!(config_from(&[(LOG_FORMAT_ENV, "xml")]).is_err());
        assert!(config_from(&[(HTTP_TIMEOUT_ENV, "0")]).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[(NETWORK_ENV, "  "), (COMPUTE_LIMIT_ENV, "")]).unwrap();
        assert_eq!(config.network, FlowNetwork::Testnet);
        assert_eq!(config.compute_limit, DEFAULT_COMPUTE_LIMIT);
    }

    #[test]
    fn contract_aliases_without_flow_json_use_defaults() {
        let config = config_from(&[(NETWORK_ENV, "emulator")]).unwrap();
        let aliases = config.contract_aliases().unwrap();
        assert_eq!(
            aliases.get(crate::scripts::PROFILE_CONTRACT).map(|a| a.as_str()),
            Some("0xf8d6e0586b0a20c7")
        );
    }
}
