//! The in-memory ledger: ordered blocks, the transaction pool, and balance
//! accounting. Pure logic, no I/O. Persistence, event publication, and peer
//! broadcast are orchestrated by `Node`, which holds this type behind the
//! chain lock.

use serde::{Deserialize, Serialize};

use crate::constants::{BLOCKCHAIN_ADDRESS, MINING_DIFFICULTY};
use crate::error::{NodeError, Result};
use crate::model::{Block, Transaction, TransactionStatus};

/// The ordered chain plus its transaction pool and peer identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub blocks: Vec<Block>,
    pub transaction_pool: Vec<Transaction>,
    pub self_address: String,
    pub mining_locked: bool,
}

impl Chain {
    /// Creates a fresh chain with a single genesis block.
    pub fn new(self_address: String) -> Self {
        Chain {
            blocks: vec![Block::genesis()],
            transaction_pool: Vec::new(),
            self_address,
            mining_locked: false,
        }
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always holds at least the genesis block")
    }

    pub fn tip_hash(&self) -> String {
        self.tip().hash()
    }

    /// Confirmed balance: sum over all blocks' `Success` transactions,
    /// crediting `to` and debiting `from`. Saturates at 0 rather than
    /// underflowing; the simulated balance check is what is supposed to
    /// prevent a real underflow from ever being reachable.
    pub fn balance(&self, address: &str) -> u64 {
        let mut balance: u64 = 0;
        for block in &self.blocks {
            for txn in &block.transactions {
                if txn.status != TransactionStatus::Success {
                    continue;
                }
                if txn.to == address {
                    balance = balance.saturating_add(txn.value);
                }
                if txn.from == address {
                    balance = balance.saturating_sub(txn.value);
                }
            }
        }
        balance
    }

    /// Confirmed balance for `address` minus pool debits by the same sender,
    /// walking the pool in chain order up to (and not including) a fresh
    /// candidate transaction's own slot.
    fn simulated_balance(&self, address: &str) -> u64 {
        let mut balance = self.balance(address);
        for pooled in &self.transaction_pool {
            if pooled.from == address {
                balance = balance.saturating_sub(pooled.value);
            }
        }
        balance
    }

    /// Admits `txn` into the pool. Rejects outright on a duplicate hash;
    /// otherwise runs the signature check and the simulated balance check
    /// and records the resulting status (`VerificationSuccess` or
    /// `VerificationFailure`) rather than rejecting a merely-insufficient
    /// transaction. Returns the pooled copy (with its public key cleared).
    pub fn submit_transaction(&mut self, mut txn: Transaction) -> Result<Transaction> {
        if self
            .transaction_pool
            .iter()
            .any(|p| p.transaction_hash == txn.transaction_hash)
        {
            return Err(NodeError::DuplicateTransaction(txn.transaction_hash.clone()));
        }

        let signature_ok = txn.verify_signature_envelope();
        let sufficient = self.simulated_balance(&txn.from) >= txn.value;

        txn.status = if signature_ok && sufficient {
            TransactionStatus::VerificationSuccess
        } else {
            TransactionStatus::VerificationFailure
        };
        txn.clear_public_key();

        self.transaction_pool.push(txn.clone());
        Ok(txn)
    }

    /// Appends `b` to the chain and drains any pool entries it contains. No
    /// verification is performed here; callers (the miner and the consensus
    /// adoption path) are responsible for only passing well-formed,
    /// chain-extending blocks.
    pub fn append_block(&mut self, block: Block) {
        let mined_hashes: std::collections::HashSet<&str> = block
            .transactions
            .iter()
            .map(|t| t.transaction_hash.as_str())
            .collect();
        self.transaction_pool
            .retain(|p| !mined_hashes.contains(p.transaction_hash.as_str()));
        self.blocks.push(block);
    }

    /// Pool entries (newest first) followed by block entries (newest
    /// first), excluding coinbase transactions.
    pub fn all_non_coinbase_transactions(&self) -> Vec<Transaction> {
        let mut result: Vec<Transaction> = self
            .transaction_pool
            .iter()
            .rev()
            .filter(|t| t.from != BLOCKCHAIN_ADDRESS)
            .cloned()
            .collect();
        for block in self.blocks.iter().rev() {
            result.extend(
                block
                    .transactions
                    .iter()
                    .rev()
                    .filter(|t| t.from != BLOCKCHAIN_ADDRESS)
                    .cloned(),
            );
        }
        result
    }

    /// Verifies that `tail` is an internally-consistent, well-formed suffix:
    /// the first block is well-formed unless it is genesis, and every
    /// subsequent block's `prev_hash` matches its predecessor's hash and is
    /// itself well-formed.
    pub fn verify_last_n(tail: &[Block]) -> bool {
        let Some(first) = tail.first() else { return false };
        if first.block_number != 0 && !first.is_well_formed_at(MINING_DIFFICULTY) {
            return false;
        }
        for window in tail.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            if next.prev_hash != prev.hash() {
                return false;
            }
            if !next.is_well_formed_at(MINING_DIFFICULTY) {
                return false;
            }
        }
        true
    }

    /// Whether `tail`'s first block connects to this chain's own history:
    /// either it is genesis, or this chain holds the block at
    /// `first.block_number - 1` and that block's hash matches `prev_hash`.
    ///
    /// Looks the ancestor up by `block_number`, not by vector position:
    /// after `adopt_tail` replaces `self.blocks` with a non-genesis-starting
    /// suffix, position and `block_number` no longer coincide.
    pub fn tail_connects(&self, tail: &[Block]) -> bool {
        let Some(first) = tail.first() else { return false };
        if first.block_number == 0 {
            return true;
        }
        let ancestor_height = first.block_number - 1;
        let earliest_held = self.blocks.first().map(|b| b.block_number).unwrap_or(0);
        let latest_held = self.tip().block_number;

        if ancestor_height < earliest_held || ancestor_height > latest_held {
            // Out of the range this chain currently holds: either the
            // ancestor predates what a prior adoption retained, or the peer
            // is further ahead than anything observed locally. Neither case
            // can be disproven, so it is not rejected as a fork.
            return true;
        }

        let index = (ancestor_height - earliest_held) as usize;
        match self.blocks.get(index) {
            Some(ancestor) if ancestor.block_number == ancestor_height => {
                ancestor.hash() == first.prev_hash
            }
            _ => false,
        }
    }

    /// Replaces the chain's blocks with `tail` wholesale, per the adopted
    /// longest-chain suffix. Caller is responsible for verification.
    pub fn adopt_tail(&mut self, tail: Vec<Block>) {
        self.blocks = tail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MINING_REWARD;

    fn mined_reward_block(chain: &Chain, miner: &str) -> Block {
        let mut block = Block::new(chain.tip_hash(), 0, chain.tip().block_number + 1);
        block
            .add_transaction(Transaction::new_coinbase(miner.to_string(), MINING_REWARD))
            .unwrap();
        block.mine(1);
        block
    }

    #[test]
    fn genesis_only_chain_has_length_one() {
        let chain = Chain::new("http://node".into());
        assert_eq!(chain.blocks.len(), 1);
        assert_eq!(chain.tip().block_number, 0);
        assert_eq!(chain.tip().prev_hash, "0x0");
    }

    #[test]
    fn reward_blocks_accumulate_balance() {
        let mut chain = Chain::new("http://node".into());
        for _ in 0..3 {
            let block = mined_reward_block(&chain, "miner");
            chain.append_block(block);
        }
        assert_eq!(chain.balance("miner"), 3 * MINING_REWARD);
        assert!(chain.transaction_pool.is_empty());
    }

    #[test]
    fn pool_admission_marks_sufficient_transaction_verified() {
        let mut chain = Chain::new("http://node".into());
        let reward = mined_reward_block(&chain, "alice");
        chain.append_block(reward);

        let (private, public) = crate::crypto::generate_keypair().unwrap();
        let alice = crate::crypto::derive_address(&public);
        // Re-fund alice under her derived address so the balance check passes.
        let mut funding = Block::new(chain.tip_hash(), 0, chain.tip().block_number + 1);
        funding
            .add_transaction(Transaction::new_coinbase(alice.clone(), MINING_REWARD))
            .unwrap();
        funding.mine(1);
        chain.append_block(funding);

        let mut txn = Transaction::new(alice, "bob".into(), 500, vec![]);
        txn.public_key = data_encoding::HEXLOWER.encode(&public);
        txn.transaction_hash = crate::crypto::hash_transaction(&txn);
        txn.signature = crate::crypto::sign(&private, txn.transaction_hash.as_bytes()).unwrap();

        let pooled = chain.submit_transaction(txn).unwrap();
        assert_eq!(pooled.status, TransactionStatus::VerificationSuccess);
        assert!(pooled.public_key.is_empty());
    }

    #[test]
    fn overspend_is_marked_verification_failure() {
        let mut chain = Chain::new("http://node".into());
        let (private, public) = crate::crypto::generate_keypair().unwrap();
        let alice = crate::crypto::derive_address(&public);

        let mut funding = Block::new(chain.tip_hash(), 0, chain.tip().block_number + 1);
        funding
            .add_transaction(Transaction::new_coinbase(alice.clone(), 1000))
            .unwrap();
        funding.mine(1);
        chain.append_block(funding);

        let sign_and_submit = |chain: &mut Chain, value: u64| {
            let mut txn = Transaction::new(alice.clone(), "bob".into(), value, vec![]);
            txn.public_key = data_encoding::HEXLOWER.encode(&public);
            txn.transaction_hash = crate::crypto::hash_transaction(&txn);
            txn.signature = crate::crypto::sign(&private, txn.transaction_hash.as_bytes()).unwrap();
            chain.submit_transaction(txn).unwrap()
        };

        let first = sign_and_submit(&mut chain, 700);
        assert_eq!(first.status, TransactionStatus::VerificationSuccess);

        let second = sign_and_submit(&mut chain, 500);
        assert_eq!(second.status, TransactionStatus::VerificationFailure);
    }

    #[test]
    fn duplicate_transaction_is_rejected() {
        let mut chain = Chain::new("http://node".into());
        let txn = Transaction::new("a".into(), "b".into(), 1, vec![]);
        chain.submit_transaction(txn.clone()).unwrap();
        assert!(matches!(
            chain.submit_transaction(txn),
            Err(NodeError::DuplicateTransaction(_))
        ));
    }

    #[test]
    fn verify_last_n_rejects_mutated_prev_hash() {
        let mut chain = Chain::new("http://node".into());
        let mut tail = vec![chain.tip().clone()];
        for _ in 0..3 {
            let mut block = Block::new(chain.tip_hash(), 0, chain.tip().block_number + 1);
            block
                .add_transaction(Transaction::new_coinbase("miner".to_string(), MINING_REWARD))
                .unwrap();
            block.mine(MINING_DIFFICULTY);
            chain.append_block(block.clone());
            tail.push(block);
        }
        assert!(Chain::verify_last_n(&tail));

        tail[2].prev_hash.push('f');
        assert!(!Chain::verify_last_n(&tail));
    }

    #[test]
    fn append_block_drains_matching_pool_entries() {
        let mut chain = Chain::new("http://node".into());
        let txn = Transaction::new("a".into(), "b".into(), 1, vec![]);
        let pooled = chain.submit_transaction(txn).unwrap();

        let mut block = Block::new(chain.tip_hash(), 0, 1);
        block.add_transaction(pooled).unwrap();
        block.mine(1);
        chain.append_block(block);

        assert!(chain.transaction_pool.is_empty());
    }

    /// After `adopt_tail` replaces `self.blocks` with a suffix that does not
    /// start at genesis, vector position no longer equals `block_number`;
    /// `tail_connects` must key off `block_number` rather than index.
    #[test]
    fn tail_connects_after_adoption_uses_block_number_not_index() {
        let mut chain = Chain::new("http://node".into());
        let mut blocks = vec![chain.tip().clone()];
        for _ in 0..5 {
            let mut block = Block::new(
                blocks.last().unwrap().hash(),
                0,
                blocks.last().unwrap().block_number + 1,
            );
            block
                .add_transaction(Transaction::new_coinbase("miner".to_string(), MINING_REWARD))
                .unwrap();
            block.mine(MINING_DIFFICULTY);
            blocks.push(block);
        }

        // Adopt only the last three blocks (numbers 3, 4, 5), mimicking a
        // chain that has pruned down to `/fetch_last_n_blocks`-style suffix.
        chain.adopt_tail(blocks[3..].to_vec());
        assert_eq!(chain.blocks.first().unwrap().block_number, 3);

        // A tail correctly extending block 5 (index 2 in the stored vec,
        // not index 5) must be accepted.
        let mut next = Block::new(chain.tip_hash(), 0, chain.tip().block_number + 1);
        next.mine(MINING_DIFFICULTY);
        assert!(chain.tail_connects(&[next]));

        // A forged tail claiming to extend block 4 but with a mismatched
        // prev_hash must be rejected, even though raw index 4 is out of
        // bounds in the now-offset `self.blocks` vector (it only holds 3
        // entries). The old index-based fallback would have wrongly
        // accepted this as "out of local reach".
        let mut forged = Block::new("0xdeadbeef".to_string(), 0, 5);
        forged.mine(MINING_DIFFICULTY);
        assert!(!chain.tail_connects(&[forged]));

        // A tail genuinely further ahead than anything held locally is
        // still accepted as unprovable rather than rejected.
        let mut far_ahead = Block::new("0xsomewhere".to_string(), 0, 9);
        far_ahead.mine(MINING_DIFFICULTY);
        assert!(chain.tail_connects(&[far_ahead]));
    }
}
