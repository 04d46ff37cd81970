//! The canonical data model: `Transaction` and `Block`. A single shape for
//! each, collapsing the divergent copies the domain once carried.

pub mod block;
pub mod transaction;

pub use block::Block;
pub use transaction::{Transaction, TransactionStatus};
