use serde::{Deserialize, Serialize};

use crate::constants::{GENESIS_PREV_HASH, MINING_DIFFICULTY, TXN_PER_BLOCK_LIMIT};
use crate::crypto::{hash_block, is_well_formed};
use crate::error::{NodeError, Result};
use crate::model::transaction::{Transaction, TransactionStatus};

fn now_ns() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_nanos() as i64
}

/// An ordered batch of transactions with a proof-of-work header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub block_number: u64,
    pub prev_hash: String,
    pub timestamp: i64,
    pub nonce: i64,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(prev_hash: String, nonce: i64, block_number: u64) -> Self {
        Block {
            block_number,
            prev_hash,
            timestamp: now_ns(),
            nonce,
            transactions: Vec::new(),
        }
    }

    pub fn genesis() -> Self {
        Block::new(GENESIS_PREV_HASH.to_string(), 0, 0)
    }

    fn payload_count(&self) -> usize {
        self.transactions.iter().filter(|t| !t.is_coinbase()).count()
    }

    /// Admits `txn` into the block, promoting `VerificationSuccess` to
    /// `Success` and demoting anything else to `Failed`. Failed transactions
    /// are still recorded; they merely do not move balance.
    pub fn add_transaction(&mut self, mut txn: Transaction) -> Result<()> {
        if !txn.is_coinbase() && self.payload_count() >= TXN_PER_BLOCK_LIMIT {
            return Err(NodeError::BlockFull);
        }
        if !txn.is_coinbase() {
            txn.status = if txn.status == TransactionStatus::VerificationSuccess {
                TransactionStatus::Success
            } else {
                TransactionStatus::Failed
            };
        }
        self.transactions.push(txn);
        Ok(())
    }

    pub fn hash(&self) -> String {
        hash_block(self)
    }

    pub fn is_well_formed(&self) -> bool {
        is_well_formed(&self.hash(), MINING_DIFFICULTY)
    }

    pub fn is_well_formed_at(&self, difficulty: usize) -> bool {
        is_well_formed(&self.hash(), difficulty)
    }

    /// Solves proof-of-work for this block in place: refreshes the timestamp
    /// each attempt and increments the nonce until the hash is well-formed.
    /// Deterministic given timestamp+nonce; the timestamp refresh is what
    /// makes two nodes unlikely to converge on the same solution.
    pub fn mine(&mut self, difficulty: usize) {
        loop {
            self.timestamp = now_ns();
            if is_well_formed(&self.hash(), difficulty) {
                return;
            }
            self.nonce += 1;
        }
    }
}
