//! The mining loop: produces candidate blocks, solves proof-of-work, and
//! appends them to the chain.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::{MINING_DIFFICULTY, MINING_PAUSE_TIME_SECS, MINING_REWARD, TXN_PER_BLOCK_LIMIT};
use crate::model::{Block, Transaction, TransactionStatus};
use crate::node::Node;

/// Runs until `shutdown` reports `true`. Polls `mining_locked` between
/// attempts and only takes the chain lock at the final append; proof-of-work
/// itself runs outside any lock, offloaded to a blocking thread so it never
/// starves the async runtime.
pub async fn run(node: Arc<Node>, miner_address: String, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            info!("mining loop stopping");
            return;
        }

        let (pool, prev_hash, tip_number, locked) = node.mining_snapshot().await;
        if locked {
            debug!("mining paused: chain is locked for consensus update");
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(MINING_PAUSE_TIME_SECS)) => {}
                _ = shutdown.changed() => {}
            }
            continue;
        }

        let mut candidate = Block::new(prev_hash, 0, tip_number + 1);
        for txn in pool.into_iter().take(TXN_PER_BLOCK_LIMIT) {
            if let Err(e) = candidate.add_transaction(txn) {
                warn!("dropping pool transaction while assembling candidate block: {e}");
            }
        }
        let mut coinbase = Transaction::new_coinbase(miner_address.clone(), MINING_REWARD);
        coinbase.status = TransactionStatus::Success;
        candidate.transactions.push(coinbase);

        candidate = tokio::task::spawn_blocking(move || {
            candidate.mine(MINING_DIFFICULTY);
            candidate
        })
        .await
        .expect("mining task does not panic");

        if node.mining_locked().await {
            debug!("discarding solved block: chain was locked mid-solve");
            continue;
        }

        let block_number = candidate.block_number;
        match node.append_block(candidate).await {
            Ok(()) => info!(block_number, miner = %miner_address, "mined and appended block"),
            Err(e) if e.is_fatal() => {
                tracing::error!("fatal persistence failure while appending mined block: {e}");
                std::process::exit(1);
            }
            Err(e) => warn!("failed to append mined block: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn one_mining_iteration_produces_a_reward_block() {
        let node = Arc::new(Node::bootstrap("http://self".into(), Box::new(InMemoryStore::new())).unwrap());
        let (pool, prev_hash, tip_number, _) = node.mining_snapshot().await;
        assert!(pool.is_empty());

        let mut candidate = Block::new(prev_hash, 0, tip_number + 1);
        candidate
            .transactions
            .push(Transaction::new_coinbase("miner".into(), MINING_REWARD));
        candidate.mine(1);
        node.append_block(candidate).await.unwrap();

        assert_eq!(node.balance("miner").await, MINING_REWARD);
        assert_eq!(node.blocks().await.len(), 2);
        assert!(node.transactions().await.is_empty());
    }
}
