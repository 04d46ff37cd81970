//! The HTTP surface: a thin JSON façade over `Node`. Carries no protocol
//! logic of its own beyond request/response shaping and error-to-status
//! mapping.

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, run};
