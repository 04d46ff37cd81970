use std::sync::Arc;

use blockchain::config::{Cli, Command};
use blockchain::crypto::{generate_keypair, derive_address, sign, hash_transaction};
use blockchain::model::Transaction;
use blockchain::node::{Node, consensus, dispatcher, miner, peer_loop};
use blockchain::store::SledStore;
use blockchain::{NodeError, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

fn initialize_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

/// One-shot helper: generates a keypair, signs a transaction to `to`, and
/// prints JSON suitable for `POST /send_txn`.
fn run_wallet(to: String, value: u64) -> Result<()> {
    let (private, public) = generate_keypair()?;
    let from = derive_address(&public);
    let mut txn = Transaction::new(from, to, value, Vec::new());
    txn.public_key = data_encoding::HEXLOWER.encode(&public);
    txn.transaction_hash = hash_transaction(&txn);
    txn.signature = sign(&private, txn.transaction_hash.as_bytes())?;
    println!("{}", serde_json::to_string_pretty(&txn).expect("transaction always serializes"));
    Ok(())
}

async fn run_chain(
    port: u16,
    miners_address: String,
    remote_node: Option<String>,
    db_path: String,
    self_address: Option<String>,
) -> Result<()> {
    let self_address = Command::self_address_or_default(port, &self_address);
    let store = SledStore::open(&db_path)?;
    let node = Arc::new(Node::bootstrap(self_address.clone(), Box::new(store))?);

    if let Some(remote) = remote_node {
        info!("seeding chain from {remote}");
        let blocks = node.sync_client().fetch_full_chain(&remote).await?;
        node.adopt_full_chain(blocks).await?;
        node.peers().add(remote).await;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let miner_handle = tokio::spawn(miner::run(node.clone(), miners_address, shutdown_rx.clone()));
    let consensus_handle = tokio::spawn(consensus::run(node.clone(), shutdown_rx.clone()));
    let peer_handle = tokio::spawn(peer_loop::run(node.clone(), shutdown_rx.clone()));
    let dispatcher_handle = tokio::spawn(dispatcher::run(node.clone(), shutdown_rx.clone()));
    let mut web_handle = tokio::spawn(blockchain::web::run(node, port, shutdown_rx));

    // Races ctrl-c against the web server exiting on its own (e.g. a bind
    // failure): either way the other loops get the shutdown signal too.
    let web_result = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.expect("failed to install ctrl-c signal handler");
            info!("shutdown signal received, stopping");
            let _ = shutdown_tx.send(true);
            web_handle.await.expect("web server task does not panic")
        }
        result = &mut web_handle => {
            let _ = shutdown_tx.send(true);
            result.expect("web server task does not panic")
        }
    };

    let _ = tokio::join!(miner_handle, consensus_handle, peer_handle, dispatcher_handle);

    web_result.map_err(|e| NodeError::InvariantViolation(format!("web server failed: {e}")))
}

#[tokio::main]
async fn main() {
    initialize_logging();
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        // clap's own default handler exits 0 on --help/--version and 2 on a
        // parse error; this system's exit-code contract only recognizes 0
        // (graceful shutdown) and 1 (failure), so --help/--version still
        // print and exit 0 via clap, but a genuine parse error is remapped
        // to 1 here instead of clap's 2.
        if e.exit_code() == 0 {
            e.exit();
        }
        eprintln!("{e}");
        std::process::exit(1);
    });

    let result = match cli.command {
        Command::Chain {
            port,
            miners_address,
            remote_node,
            db_path,
            self_address,
        } => run_chain(port, miners_address, remote_node, db_path, self_address).await,
        Command::Wallet { to, value } => run_wallet(to, value),
    };

    if let Err(e) = result {
        error!("fatal error: {e}");
        std::process::exit(1);
    }
}
