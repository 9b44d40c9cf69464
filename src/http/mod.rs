//! Canonical request/response types shared by the bridge and the embedded
//! application.

mod request;
mod response;

pub use request::{CanonicalRequest, Method};
pub use response::{CanonicalResponse, StatusCode};
