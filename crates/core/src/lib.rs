//! `relaykey-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod code;
pub mod error;
pub mod window;

pub use code::AccessCode;
pub use error::{DomainError, DomainResult};
pub use window::{ValidityWindow, WindowStatus};
