//! Deterministic fingerprinting for blocks and transactions.
//!
//! Hashes are computed over a dedicated canonical payload, not the wire
//! struct itself, so that adding an unrelated field to `Transaction` or
//! `Block` later can never silently change a historical hash.

use ring::digest::{Context, SHA256};
use serde::Serialize;

use crate::model::{Block, Transaction};

const HEX_PREFIX: &str = "0x";

fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    context.finish().as_ref().to_vec()
}

fn hex_prefixed(digest: &[u8]) -> String {
    format!("{HEX_PREFIX}{}", data_encoding::HEXLOWER.encode(digest))
}

/// The exact fields that participate in a transaction's hash, in the fixed
/// order they are serialized. Signature and public key are deliberately
/// excluded.
#[derive(Serialize)]
struct TransactionHashPayload<'a> {
    from: &'a str,
    to: &'a str,
    value: u64,
    data: &'a [u8],
    timestamp: i64,
}

/// The exact fields that participate in a block's hash. Every transaction
/// field (including signatures of contained transactions) is included.
#[derive(Serialize)]
struct BlockHashPayload<'a> {
    block_number: u64,
    prev_hash: &'a str,
    timestamp: i64,
    nonce: i64,
    transactions: &'a [Transaction],
}

/// Computes the canonical transaction hash: `"0x" + hex(sha256(payload))`.
pub fn hash_transaction(txn: &Transaction) -> String {
    let payload = TransactionHashPayload {
        from: &txn.from,
        to: &txn.to,
        value: txn.value,
        data: &txn.data,
        timestamp: txn.timestamp,
    };
    let bytes = serde_json::to_vec(&payload).expect("transaction hash payload is always encodable");
    hex_prefixed(&sha256_digest(&bytes))
}

/// Computes the canonical block hash: `"0x" + hex(sha256(payload))`.
pub fn hash_block(block: &Block) -> String {
    let payload = BlockHashPayload {
        block_number: block.block_number,
        prev_hash: &block.prev_hash,
        timestamp: block.timestamp,
        nonce: block.nonce,
        transactions: &block.transactions,
    };
    let bytes = serde_json::to_vec(&payload).expect("block hash payload is always encodable");
    hex_prefixed(&sha256_digest(&bytes))
}

/// A hash is well-formed at `difficulty` iff the first `difficulty` hex
/// nibbles after the `0x` prefix are all `'0'`.
pub fn is_well_formed(hash: &str, difficulty: usize) -> bool {
    match hash.strip_prefix(HEX_PREFIX) {
        Some(rest) => rest.len() >= difficulty && rest.as_bytes()[..difficulty].iter().all(|&b| b == b'0'),
        None => false,
    }
}
