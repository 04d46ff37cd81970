use std::sync::Arc;

use blockchain::crypto::{derive_address, generate_keypair, hash_transaction, sign};
use blockchain::model::Transaction;
use blockchain::node::Node;
use blockchain::store::SledStore;
use tempfile::TempDir;

/// Boots a fresh node backed by a throwaway sled database.
pub fn temp_node(self_address: &str) -> (Arc<Node>, TempDir) {
    let dir = TempDir::new().expect("failed to create temp directory");
    let store = SledStore::open(dir.path().to_str().unwrap()).expect("failed to open store");
    let node = Node::bootstrap(self_address.to_string(), Box::new(store)).expect("bootstrap failed");
    (Arc::new(node), dir)
}

/// Generates a keypair and its derived address, for signing test transactions.
pub fn test_identity() -> (Vec<u8>, Vec<u8>, String) {
    let (private, public) = generate_keypair().expect("keypair generation failed");
    let address = derive_address(&public);
    (private, public, address)
}

/// Builds and signs a transaction from `from` (whose keys are `private`/`public`) to `to`.
pub fn signed_transaction(private: &[u8], public: &[u8], from: String, to: &str, value: u64) -> Transaction {
    let mut txn = Transaction::new(from, to.to_string(), value, Vec::new());
    txn.public_key = data_encoding::HEXLOWER.encode(public);
    txn.transaction_hash = hash_transaction(&txn);
    txn.signature = sign(private, txn.transaction_hash.as_bytes()).expect("signing failed");
    txn
}
