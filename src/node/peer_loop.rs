//! The peer loop: periodically probes every known peer's liveness and
//! gossips the resulting liveness map back out to whoever is still alive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::{PEER_BROADCAST_PAUSE_TIME_SECS, PEER_PING_PAUSE_TIME_SECS};
use crate::node::Node;

pub async fn run(node: Arc<Node>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(PEER_PING_PAUSE_TIME_SECS)) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("peer loop stopping");
                    return;
                }
            }
        }
        if *shutdown.borrow() {
            return;
        }
        tick(&node).await;
    }
}

/// One round: checks every known peer other than self, records the result,
/// then gossips the full liveness map to whoever answered alive.
async fn tick(node: &Node) {
    let self_address = node.self_address().await;
    let known: Vec<String> = node
        .peers()
        .snapshot()
        .await
        .into_keys()
        .filter(|addr| addr != &self_address)
        .collect();

    for peer in &known {
        let alive = node.sync_client().check_status(peer).await.unwrap_or(false);
        node.peers().set_status(peer, alive).await;
        debug!(peer, alive, "peer status checked");
    }

    let liveness = node.peers().liveness_map().await;
    let alive_peers = node.peers().alive_peers_excluding_self().await;
    for peer in alive_peers {
        if let Err(e) = node.sync_client().send_peers_list(&peer, &liveness).await {
            warn!("failed to broadcast peer list to {peer}: {e}");
        }
        tokio::time::sleep(Duration::from_secs(PEER_BROADCAST_PAUSE_TIME_SECS)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn tick_against_no_known_peers_is_a_no_op() {
        let node = Node::bootstrap("http://self".into(), Box::new(InMemoryStore::new())).unwrap();
        tick(&node).await;
        let liveness = node.peers().liveness_map().await;
        assert_eq!(liveness.len(), 1);
        assert_eq!(liveness.get("http://self"), Some(&true));
    }

    #[tokio::test]
    async fn tick_marks_unreachable_peer_dead() {
        let node = Node::bootstrap("http://self".into(), Box::new(InMemoryStore::new())).unwrap();
        node.peers().add("http://unreachable.invalid".into()).await;
        tick(&node).await;
        let liveness = node.peers().liveness_map().await;
        assert_eq!(liveness.get("http://unreachable.invalid"), Some(&false));
    }
}
