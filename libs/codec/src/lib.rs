//! # Flowbus Wire Codec
//!
//! ## Purpose
//!
//! Encodes the routing metadata that precedes every published flow record.
//! A subscriber reads the 3-byte header part to learn the payload length and
//! which collector produced the record, without parsing the payload itself.
//!
//! ## Architecture Role
//!
//! ```text
//! upstream decoder → (key, payload) → [codec] → transport
//!                                        ↓
//!                               FlowHeader::to_bytes()
//!                               part 1 of the multi-part message
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or connection handling (belongs in `flowbus-transport`)
//! - Payload serialization; payloads are opaque bytes produced upstream

pub mod constants;
pub mod error;
pub mod header;

pub use constants::{HEADER_SIZE, MAX_PAYLOAD_SIZE, PARTS_PER_MESSAGE};
pub use error::CodecError;
pub use header::FlowHeader;
