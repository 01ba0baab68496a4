//! `relaykey-gate` — gates physical actuation behind code validity.
//!
//! The authoritative state machine: every verification attempt lands in
//! exactly one of four states, every decision is recorded in the audit
//! trail, and only an authorized code reaches the transport.

pub mod gate;

pub use gate::{CommandGate, DispatchError, Dispatched, VerifyOutcome};
