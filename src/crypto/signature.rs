//! ECDSA P-256 signing and verification, the external-collaborator surface
//! the node core consumes for `Transaction::verify`.

use ring::rand::SystemRandom;
use ring::signature::{
    ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair,
};

use crate::error::{NodeError, Result};

/// Generates a new ECDSA P-256 key pair. Returns `(pkcs8_private_key, public_key)`.
pub fn generate_keypair() -> Result<(Vec<u8>, Vec<u8>)> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| NodeError::KeyPairError(e.to_string()))?;
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
        .map_err(|e| NodeError::KeyPairError(e.to_string()))?;
    let public_key = key_pair.public_key().as_ref().to_vec();
    Ok((pkcs8.as_ref().to_vec(), public_key))
}

/// Signs `message` with a PKCS#8-encoded ECDSA P-256 private key.
pub fn sign(pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| NodeError::SigningError(e.to_string()))?;
    key_pair
        .sign(&rng, message)
        .map(|sig| sig.as_ref().to_vec())
        .map_err(|e| NodeError::SigningError(e.to_string()))
}

/// Verifies an ECDSA P-256 signature against `message` under `public_key`.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let unparsed = ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, public_key);
    unparsed.verify(message, signature).is_ok()
}
