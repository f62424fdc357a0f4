//! HTTP inbound adapter receiving document events and serving probes.

pub mod error;
pub mod events;
pub mod health;
pub mod state;
pub mod trace;

pub use error::ErrorBody;
pub use trace::Trace;
