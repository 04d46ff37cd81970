use thiserror::Error;

/// Error taxonomy for the node core.
///
/// Each variant belongs to one of the buckets described in the error handling
/// design: validation errors are reported to the caller and the node keeps
/// running, transient peer errors are logged and retried on the next loop
/// tick, chain-verification failures silently reject a candidate tail, and
/// persistence/invariant failures are fatal.
#[derive(Clone, Error, Debug)]
pub enum NodeError {
    // --- Validation: reported to caller, node continues ---
    #[error("duplicate transaction: {0}")]
    DuplicateTransaction(String),
    #[error("invalid signature for transaction {0}")]
    InvalidSignature(String),
    #[error("malformed request body: {0}")]
    MalformedRequest(String),
    #[error("block is full")]
    BlockFull,
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    // --- Transient peer: logged, peer skipped this round ---
    #[error("peer request to {0} failed: {1}")]
    PeerUnreachable(String, String),
    #[error("peer {0} returned an unexpected response")]
    PeerBadResponse(String),
    #[error("peer request to {0} timed out")]
    PeerTimeout(String),

    // --- Chain-verification failure: tail rejected, local chain untouched ---
    #[error("candidate tail failed verification: {0}")]
    ChainVerificationFailed(String),

    // --- Persistence failure: fatal ---
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    // --- Programming invariant violation: fatal ---
    #[error("chain tip missing")]
    MissingTip,
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    // --- Serialization plumbing ---
    #[error("block serialization error: {0}")]
    BlockSerializationError(String),
    #[error("block deserialization error: {0}")]
    BlockDeserializationError(String),
    #[error("transaction serialization error: {0}")]
    TransactionSerializationError(String),
    #[error("transaction deserialization error: {0}")]
    TransactionDeserializationError(String),

    // --- Cryptography ---
    #[error("key pair generation error: {0}")]
    KeyPairError(String),
    #[error("signing error: {0}")]
    SigningError(String),
    #[error("address decoding error: {0}")]
    AddressDecodingError(String),
}

impl NodeError {
    /// True for the two taxonomy buckets that must abort the process rather
    /// than be logged and shrugged off.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NodeError::PersistenceFailure(_)
                | NodeError::MissingTip
                | NodeError::InvariantViolation(_)
        )
    }

    /// True for errors the HTTP layer should map to 400 rather than 404/500.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NodeError::DuplicateTransaction(_)
                | NodeError::InvalidSignature(_)
                | NodeError::MalformedRequest(_)
                | NodeError::BlockFull
                | NodeError::InvalidAddress(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NodeError>;
