//! The embedded application contract and its warm, once-per-process
//! lifecycle.

pub mod handler;
pub mod registry;

pub use handler::BridgeApp;
pub use registry::WarmRegistry;
