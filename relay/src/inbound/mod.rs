//! Inbound adapters translating external triggers into domain calls.

pub mod http;
