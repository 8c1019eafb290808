//! # sim_save
//!
//! Persistence for the sector simulation.
//!
//! - [`document`]: the [`SaveDocument`] layout and its version.
//! - [`json`]: pretty JSON encoding, the self-describing format.
//! - [`msgpack`]: compact MessagePack encoding.
//! - [`error`]: save-layer error types.
//!
//! Where the bytes go is up to the caller.

pub mod document;
pub mod error;
pub mod json;
pub mod msgpack;

pub use document::{SAVE_VERSION, SaveDocument};
pub use error::SaveError;
