// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use flow_profile::blockchain::{
    AccessNodeClient, Address, Profile, TransactionId, TransactionStatus,
};
use flow_profile::config::AppConfig;
use flow_profile::scripts::ProfilePrograms;
use flow_profile::{logging, ClientError};

const USAGE: &str = "usage:
  flow-profile profile <address>        print the on-chain profile of an account
  flow-profile watch <transaction-id>   follow a transaction until it is sealed";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&config, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig, args: &[String]) -> Result<(), ClientError> {
    let client = AccessNodeClient::new(config.access_node_api.clone(), config.http_timeout)?;
    info!(
        app = %config.app_title,
        network = %config.network,
        access_node = %config.access_node_api,
        "Flow profile client"
    );

    match args {
        [command, address] if command == "profile" => {
            show_profile(config, &client, address).await
        }
        [command, id] if command == "watch" => {
            watch_transaction(config, &client, TransactionId::from(id.as_str())).await
        }
        _ => {
            eprintln!("{USAGE}");
            Err(ClientError::Config("unrecognized arguments".to_string()))
        }
    }
}

async fn show_profile(
    config: &AppConfig,
    client: &AccessNodeClient,
    raw_address: &str,
) -> Result<(), ClientError> {
    let address: Address = raw_address.parse()?;
    let programs = ProfilePrograms::resolve(&config.contract_aliases()?)?;

    let value = client.execute_script(&programs.read_profile(&address)).await?;
    let profile: Option<Profile> = serde_json::from_value(value.to_json())
        .map_err(|e| ClientError::Decode(format!("unexpected profile shape: {e}")))?;

    let rendered = serde_json::to_string_pretty(&profile)
        .map_err(|e| ClientError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

async fn watch_transaction(
    config: &AppConfig,
    client: &AccessNodeClient,
    id: TransactionId,
) -> Result<(), ClientError> {
    let shutdown = CancellationToken::new();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut updates = client.watch_transaction(id.clone(), config.tx_poll_interval, shutdown.clone());
    let mut last = None;
    while let Some(update) = updates.recv().await {
        println!(
            "{}",
            json!({
                "transaction_id": id,
                "status": update.status,
                "status_code": update.status.code(),
                "error_message": update.error_message,
            })
        );
        last = Some(update);
    }

    match last {
        Some(update) if update.failure().is_some() => Err(ClientError::TransactionRejected {
            id,
            message: update.failure().unwrap_or_default(),
        }),
        Some(update) if update.status == TransactionStatus::Sealed => Ok(()),
        Some(update) if update.status == TransactionStatus::Expired => {
            Err(ClientError::TransactionRejected {
                id,
                message: "transaction expired".to_string(),
            })
        }
        _ if shutdown.is_cancelled() => Ok(()),
        _ => Err(ClientError::Transport(format!(
            "status stream for {id} ended before a terminal status"
        ))),
    }
}
