//! Local invocation runtime: a development harness that feeds plain HTTP
//! traffic through the bridge as envelope invocations.

mod config;
mod server;

pub use config::BridgeConfig;
pub use server::LocalServer;
