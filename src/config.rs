//! Command-line configuration. Two subcommands mirror the two processes the
//! original system ships: a long-running chain node and a one-shot wallet
//! helper that signs a transaction for submission via `send_txn`.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "blockchain")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a chain node: mining loop, consensus loop, peer loop, event
    /// dispatcher, and HTTP surface.
    Chain {
        #[arg(long)]
        port: u16,
        #[arg(long)]
        miners_address: String,
        /// An existing peer's full HTTP address to seed the chain and peer
        /// set from at startup.
        #[arg(long)]
        remote_node: Option<String>,
        #[arg(long, env = "KNIRVCHAIN_DB_PATH", default_value = crate::constants::DEFAULT_DB_PATH)]
        db_path: String,
        /// This node's own externally-reachable HTTP address. Defaults to
        /// `http://127.0.0.1:<port>` when not given.
        #[arg(long, env = "KNIRVCHAIN_SELF_ADDRESS")]
        self_address: Option<String>,
    },
    /// Generate a keypair, derive its address, and sign a transaction JSON
    /// body suitable for `POST /send_txn` against a running node. Does not
    /// start a server of its own.
    Wallet {
        #[arg(long)]
        to: String,
        #[arg(long)]
        value: u64,
    },
}

impl Command {
    pub fn self_address_or_default(port: u16, self_address: &Option<String>) -> String {
        self_address
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}"))
    }
}
