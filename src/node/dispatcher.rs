//! The event dispatcher: the single subscriber that turns local state
//! changes into peer broadcasts and structured log lines. Runs for the life
//! of the process; a lagging dispatcher misses the oldest unread events
//! rather than blocking whichever loop published them.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::events::Event;
use crate::node::Node;

pub async fn run(node: Arc<Node>, mut shutdown: watch::Receiver<bool>) {
    let mut events = node.subscribe_events();
    loop {
        tokio::select! {
            received = events.recv() => {
                match received {
                    Ok(event) => handle(&node, event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event dispatcher lagged, skipped events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("event dispatcher stopping");
                    return;
                }
            }
        }
        if *shutdown.borrow() {
            return;
        }
    }
}

async fn handle(node: &Node, event: Event) {
    match event {
        Event::BlockAdded(block) => {
            info!(block_number = block.block_number, "block added");
        }
        Event::TransactionAdded(txn) => {
            info!(transaction_hash = %txn.transaction_hash, "transaction added");
            let peers = node.peers().alive_peers_excluding_self().await;
            for peer in peers {
                let node = node.sync_client().clone();
                let txn = txn.clone();
                let peer_addr = peer.clone();
                tokio::spawn(async move {
                    if let Err(e) = node.send_txn(&peer_addr, &txn).await {
                        warn!("failed to forward transaction to {peer_addr}: {e}");
                    }
                });
            }
        }
    }
}
