//! Peer liveness tracking and the HTTP client used to fetch tails/full
//! chains from other nodes.

pub mod registry;
pub mod sync_client;

pub use registry::{PeerInfo, PeerRegistry};
pub use sync_client::SyncClient;
