use std::time::Duration;

use crate::constants::{FETCH_LAST_N_BLOCKS, PEER_PING_PAUSE_TIME_SECS, STATUS_RUNNING};
use crate::error::{NodeError, Result};
use crate::model::{Block, Transaction};

/// HTTP client for the peer-to-peer primitives the node needs: tail fetch
/// and full-chain fetch for consensus, a status probe for the peer loop,
/// liveness gossip, and transaction forwarding. Backed by a shared
/// `reqwest::Client` with a bounded timeout so a stalled peer cannot stall
/// consensus.
#[derive(Clone)]
pub struct SyncClient {
    http: reqwest::Client,
}

impl SyncClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PEER_PING_PAUSE_TIME_SECS / 2))
            .build()
            .expect("reqwest client configuration is always valid");
        SyncClient { http }
    }

    /// Fetches up to `FETCH_LAST_N_BLOCKS` most-recent blocks from `peer`.
    pub async fn fetch_tail(&self, peer: &str) -> Result<Vec<Block>> {
        let url = format!("{}/fetch_last_n_blocks", peer.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::PeerUnreachable(peer.to_string(), e.to_string()))?
            .error_for_status()
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
        let blocks: Vec<Block> = response
            .json()
            .await
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
        if blocks.len() > FETCH_LAST_N_BLOCKS {
            return Err(NodeError::PeerBadResponse(format!(
                "{peer} returned more than {FETCH_LAST_N_BLOCKS} blocks"
            )));
        }
        Ok(blocks)
    }

    /// Fetches the peer's entire chain; used once at bootstrap against
    /// `--remote_node`.
    pub async fn fetch_full_chain(&self, peer: &str) -> Result<Vec<Block>> {
        let url = format!("{}/blocks", peer.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::PeerUnreachable(peer.to_string(), e.to_string()))?
            .error_for_status()
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))
    }

    /// Lightweight liveness probe expecting the literal `"RUNNING"`.
    pub async fn check_status(&self, peer: &str) -> Result<bool> {
        let url = format!("{}/check_status", peer.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::PeerUnreachable(peer.to_string(), e.to_string()))?;
        match response.error_for_status() {
            Ok(response) => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
                Ok(body.trim_matches('"') == STATUS_RUNNING)
            }
            Err(_) => Ok(false),
        }
    }

    /// Broadcasts the full liveness map to `peer`.
    pub async fn send_peers_list(
        &self,
        peer: &str,
        liveness: &std::collections::HashMap<String, bool>,
    ) -> Result<()> {
        let url = format!("{}/send_peers_list", peer.trim_end_matches('/'));
        self.http
            .post(&url)
            .json(liveness)
            .send()
            .await
            .map_err(|e| NodeError::PeerUnreachable(peer.to_string(), e.to_string()))?
            .error_for_status()
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
        Ok(())
    }

    /// Forwards a pooled transaction to `peer`'s `/send_txn` endpoint. Best
    /// effort: failures are logged by the caller and do not block the
    /// publishing node.
    pub async fn send_txn(&self, peer: &str, txn: &Transaction) -> Result<()> {
        let url = format!("{}/send_txn", peer.trim_end_matches('/'));
        self.http
            .post(&url)
            .json(txn)
            .send()
            .await
            .map_err(|e| NodeError::PeerUnreachable(peer.to_string(), e.to_string()))?
            .error_for_status()
            .map_err(|e| NodeError::PeerBadResponse(format!("{peer}: {e}")))?;
        Ok(())
    }
}

impl Default for SyncClient {
    fn default() -> Self {
        Self::new()
    }
}
