//! The consensus loop: periodically polls every known alive peer, adopts the
//! longest verified, chain-connecting tail.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::constants::CONSENSUS_PAUSE_TIME_SECS;
use crate::node::Node;

pub async fn run(node: Arc<Node>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(CONSENSUS_PAUSE_TIME_SECS)) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("consensus loop stopping");
                    return;
                }
            }
        }
        if *shutdown.borrow() {
            return;
        }
        if node.mining_locked().await {
            continue;
        }
        tick(&node).await;
    }
}

/// One consensus round: finds the longest verified, connecting tail among
/// alive peers and adopts it if it beats the local chain. A tie keeps the
/// local chain.
async fn tick(node: &Node) {
    let peers = node.peers().alive_peers_excluding_self().await;
    let self_address = node.self_address().await;
    let mut adopted: Option<Vec<crate::model::Block>> = None;

    for peer in peers {
        if peer == self_address {
            continue;
        }
        match node.sync_client().fetch_tail(&peer).await {
            Ok(tail) => {
                if node.candidate_tail_is_acceptable(&tail).await {
                    let better = match &adopted {
                        Some(current) => tail.last().map(|b| b.block_number)
                            > current_tail_tip(current),
                        None => true,
                    };
                    if better {
                        adopted = Some(tail);
                    }
                }
            }
            Err(e) => {
                warn!("skipping peer {peer} this consensus round: {e}");
                node.peers().set_status(&peer, false).await;
            }
        }
    }

    if let Some(tail) = adopted {
        let tip = tail.last().map(|b| b.block_number).unwrap_or_default();
        match node.adopt_tail(tail).await {
            Ok(()) => info!(new_tip = tip, "adopted longer verified chain"),
            Err(e) if e.is_fatal() => {
                tracing::error!("fatal persistence failure while adopting chain: {e}");
                std::process::exit(1);
            }
            Err(e) => warn!("failed to persist adopted chain: {e}"),
        }
    }
}

fn current_tail_tip(tail: &[crate::model::Block]) -> Option<u64> {
    tail.last().map(|b| b.block_number)
}
