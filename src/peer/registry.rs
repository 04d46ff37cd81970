use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Liveness state for a single peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub status: bool,
    pub last_ping: i64,
}

fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_nanos() as i64
}

/// The set of known peers and their liveness. Mutations are serialized
/// through an internal mutex independent of the chain lock.
pub struct PeerRegistry {
    self_address: String,
    peers: Mutex<HashMap<String, PeerInfo>>,
}

impl PeerRegistry {
    /// Creates a registry seeded with `self_address`, always present with
    /// `status=true`.
    pub fn new(self_address: String) -> Self {
        Self::with_initial_peers(self_address, HashMap::new())
    }

    /// Creates a registry seeded with `self_address` plus a recovered peer
    /// map (e.g. from a loaded snapshot). `self_address` always wins if
    /// present in both.
    pub fn with_initial_peers(self_address: String, mut peers: HashMap<String, PeerInfo>) -> Self {
        peers.insert(
            self_address.clone(),
            PeerInfo {
                status: true,
                last_ping: now_ns(),
            },
        );
        PeerRegistry {
            self_address,
            peers: Mutex::new(peers),
        }
    }

    pub fn self_address(&self) -> &str {
        &self.self_address
    }

    pub async fn add(&self, peer: String) {
        let mut peers = self.peers.lock().await;
        peers.entry(peer).or_insert(PeerInfo {
            status: true,
            last_ping: now_ns(),
        });
    }

    pub async fn remove(&self, id: &str) {
        if id == self.self_address {
            return;
        }
        self.peers.lock().await.remove(id);
    }

    /// Merges a liveness map received from a gossip broadcast. Existing
    /// peers have their status updated; unknown peers are added with the
    /// status as received. This node's own entry is never overwritten.
    pub async fn update_statuses(&self, updates: HashMap<String, bool>) {
        let mut peers = self.peers.lock().await;
        let self_address = self.self_address.clone();
        for (addr, status) in updates {
            if addr == self_address {
                continue;
            }
            peers
                .entry(addr)
                .and_modify(|info| info.status = status)
                .or_insert(PeerInfo {
                    status,
                    last_ping: now_ns(),
                });
        }
    }

    pub async fn set_status(&self, addr: &str, status: bool) {
        let mut peers = self.peers.lock().await;
        if let Some(info) = peers.get_mut(addr) {
            info.status = status;
            info.last_ping = now_ns();
        }
    }

    /// A consistent point-in-time copy of the peer map, taken under the
    /// lock and then iterated outside it.
    pub async fn snapshot(&self) -> HashMap<String, PeerInfo> {
        self.peers.lock().await.clone()
    }

    pub async fn liveness_map(&self) -> HashMap<String, bool> {
        self.peers
            .lock()
            .await
            .iter()
            .map(|(addr, info)| (addr.clone(), info.status))
            .collect()
    }

    pub async fn alive_peers_excluding_self(&self) -> Vec<String> {
        self.peers
            .lock()
            .await
            .iter()
            .filter(|(addr, info)| info.status && addr.as_str() != self.self_address)
            .map(|(addr, _)| addr.clone())
            .collect()
    }
}
