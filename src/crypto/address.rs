//! Address derivation: sha256(public_key) Base58-encoded with the chain's
//! address prefix. The exact derivation scheme is this implementation's own
//! choice (unspecified beyond "a public key hashes to `from`").

use ring::digest::{Context, SHA256};

use crate::error::{NodeError, Result};

pub const ADDRESS_PREFIX: &str = "knirvchain";

/// Derives the node's address format from a raw public key.
pub fn derive_address(public_key: &[u8]) -> String {
    let mut context = Context::new(&SHA256);
    context.update(public_key);
    let digest = context.finish();
    format!("{ADDRESS_PREFIX}{}", bs58::encode(digest.as_ref()).into_string())
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| NodeError::AddressDecodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signature::generate_keypair;

    #[test]
    fn address_derivation_is_deterministic() {
        let (_, public) = generate_keypair().unwrap();
        assert_eq!(derive_address(&public), derive_address(&public));
    }

    #[test]
    fn address_carries_prefix() {
        let (_, public) = generate_keypair().unwrap();
        assert!(derive_address(&public).starts_with(ADDRESS_PREFIX));
    }

    #[test]
    fn base58_round_trips() {
        let data = b"knirvchain test payload";
        let encoded = base58_encode(data);
        assert_eq!(base58_decode(&encoded).unwrap(), data);
    }
}
