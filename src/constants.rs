//! Bit-exact protocol constants.

pub const MINING_DIFFICULTY: usize = 5;
pub const DECIMAL: u64 = 100;
pub const MINING_REWARD: u64 = 1200 * DECIMAL;
pub const CURRENCY_NAME: &str = "nrn";
pub const BLOCKCHAIN_NAME: &str = "KNIRVCHAIN";
pub const BLOCKCHAIN_ADDRESS: &str = "KNIRVCHAIN_Faucet";
pub const ADDRESS_PREFIX: &str = "knirvchain";
pub const HEX_PREFIX: &str = "0x";
pub const GENESIS_PREV_HASH: &str = "0x0";

/// Payload transactions per block, excluding the coinbase slot. Not emitted
/// as a numeric constant anywhere upstream; this implementation's own choice.
pub const TXN_PER_BLOCK_LIMIT: usize = 1024;

pub const FETCH_LAST_N_BLOCKS: usize = 50;
pub const PEER_PING_PAUSE_TIME_SECS: u64 = 60;
pub const PEER_BROADCAST_PAUSE_TIME_SECS: u64 = 1;
pub const TXN_BROADCAST_PAUSE_TIME_SECS: u64 = 1;
pub const CONSENSUS_PAUSE_TIME_SECS: u64 = 10;

/// Not named in the upstream constant set; matches the lock-polling sleep
/// duration used by the mining loop in the source this was distilled from.
pub const MINING_PAUSE_TIME_SECS: u64 = 5;

pub const BLOCKCHAIN_KEY: &str = "blockchain_key";
pub const DEFAULT_DB_PATH: &str = "database/knirv.db";

pub const STATUS_RUNNING: &str = "RUNNING";
