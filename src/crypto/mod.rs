//! Cryptographic external-collaborator surface: hashing, signing, and
//! address derivation. The node core depends only on the free functions
//! exported here, not on any particular backend crate.

pub mod address;
pub mod hash;
pub mod signature;

pub use address::{ADDRESS_PREFIX, base58_decode, base58_encode, derive_address};
pub use hash::{hash_block, hash_transaction, is_well_formed};
pub use signature::{generate_keypair, sign, verify_signature};
