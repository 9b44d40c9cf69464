//! Platform invocation envelopes and their normalization into canonical
//! requests.

mod event;
mod normalize;

pub use event::{
    EnvelopeResponse, HttpPayload, InvocationContext, InvocationEnvelope, TriggerEvent,
    WsClosePayload, WsConnectPayload, WsMessagePayload,
};
pub use normalize::normalize;

pub(crate) use normalize::decode_body;
