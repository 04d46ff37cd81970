use serde::{Deserialize, Serialize};

use crate::constants::BLOCKCHAIN_ADDRESS;
use crate::crypto::hash_transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    VerificationSuccess,
    VerificationFailure,
    Success,
    Failed,
}

/// A value-transfer record with a signature envelope.
///
/// `transaction_hash` fingerprints `from`, `to`, `value`, `data`, and
/// `timestamp` only; `signature` and `public_key` are excluded so the hash
/// survives pool admission clearing the public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub value: u64,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub timestamp: i64,
    pub status: TransactionStatus,
    pub transaction_hash: String,
    /// Hex-encoded public key; cleared to empty after pool admission.
    pub public_key: String,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&data_encoding::HEXLOWER.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        data_encoding::HEXLOWER
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

fn now_ns() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_nanos() as i64
}

impl Transaction {
    /// Builds a new pending, unsigned transaction and stamps its hash.
    pub fn new(from: String, to: String, value: u64, data: Vec<u8>) -> Self {
        let timestamp = now_ns();
        let mut txn = Transaction {
            from,
            to,
            value,
            data,
            timestamp,
            status: TransactionStatus::Pending,
            transaction_hash: String::new(),
            public_key: String::new(),
            signature: Vec::new(),
        };
        txn.transaction_hash = hash_transaction(&txn);
        txn
    }

    /// Builds the miner's coinbase reward transaction. Carries no signature
    /// and is admitted directly with `Success` status.
    pub fn new_coinbase(to: String, reward: u64) -> Self {
        let mut txn = Transaction::new(BLOCKCHAIN_ADDRESS.to_string(), to, reward, Vec::new());
        txn.status = TransactionStatus::Success;
        txn
    }

    pub fn is_coinbase(&self) -> bool {
        self.from == BLOCKCHAIN_ADDRESS
    }

    /// Validates this transaction's cryptographic envelope only: signature
    /// validity and that the public key derives `from`. Does not consider
    /// balance; the simulated balance check is `Chain`'s responsibility
    /// because it needs pool/chain context this type does not have.
    pub fn verify_signature_envelope(&self) -> bool {
        if self.is_coinbase() {
            return true;
        }
        let Ok(public_key) = data_encoding::HEXLOWER.decode(self.public_key.as_bytes()) else {
            return false;
        };
        if crate::crypto::derive_address(&public_key) != self.from {
            return false;
        }
        crate::crypto::verify_signature(
            &public_key,
            self.transaction_hash.as_bytes(),
            &self.signature,
        )
    }

    /// Clears the public key field; called on pool admission since the hash
    /// was already computed and does not depend on it.
    pub fn clear_public_key(&mut self) {
        self.public_key.clear();
    }
}
