// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use lending_session::blockchain::{KeySource, LocalKeyConnector};
use lending_session::config::{KEY_PEM_ENV, PRIVATE_KEY_ENV};
use lending_session::{logging, SessionConfig, SessionError, SessionManager, TxKind, TxState};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = SessionConfig::from_env().map_err(|e| format!("Configuration error: {e}"))?;

    let key = match (std::env::var(PRIVATE_KEY_ENV), std::env::var(KEY_PEM_ENV)) {
        (Ok(hex), _) => KeySource::Hex(hex),
        (_, Ok(path)) => KeySource::PemFile(PathBuf::from(path)),
        _ => return Err(format!("Set {PRIVATE_KEY_ENV} or {KEY_PEM_ENV}")),
    };

    let connector = LocalKeyConnector::new(config.network.clone(), key);
    let manager = SessionManager::new(Arc::new(connector), config);

    let session = manager.connect().await.map_err(describe)?;
    println!("Connected account: {}", session.account_address);
    print_snapshot(&manager);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, amount) = match args.as_slice() {
        [] => return Ok(()),
        [kind, amount] => (parse_kind(kind)?, amount.as_str()),
        _ => return Err("Usage: lending-session [lend|borrow|repay <amount>]".to_string()),
    };

    let handle = manager.submit(kind, amount).await.map_err(describe)?;
    println!("Submitted {kind} of {amount}: {:?}", handle.tx_reference());

    match handle.settled().await {
        Some(tx) => match tx.state() {
            TxState::Confirmed(receipt) => {
                println!("Confirmed in block {}", receipt.block_number);
                manager.refresh_account_state().await.map_err(describe)?;
                print_snapshot(&manager);
            }
            _ => {
                if let Some(error) = tx.error() {
                    return Err(describe(error));
                }
            }
        },
        None => return Err("Transaction tracking was abandoned".to_string()),
    }

    Ok(())
}

fn parse_kind(raw: &str) -> Result<TxKind, String> {
    match raw.to_ascii_lowercase().as_str() {
        "lend" => Ok(TxKind::Lend),
        "borrow" => Ok(TxKind::Borrow),
        "repay" => Ok(TxKind::Repay),
        other => Err(format!("Unknown operation `{other}`")),
    }
}

fn print_snapshot(manager: &SessionManager) {
    if let Some(snapshot) = manager.snapshot() {
        println!("Balance: {}", snapshot.native_balance);
        println!("Interest Rate: {}%", snapshot.interest_rate_percent);
    }
}

fn describe(error: SessionError) -> String {
    format!("{} ({})", error.category().user_message(), error)
}
