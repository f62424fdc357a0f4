//! Firebase Cloud Messaging outbound adapters.
//!
//! This module provides a thin HTTP v1 implementation of the `PushGateway`
//! port.

mod dto;
mod push_gateway;

pub use push_gateway::FcmPushGateway;
