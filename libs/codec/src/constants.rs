//! # Wire Constants
//!
//! Values that define the published message framing. They must remain stable:
//! every subscriber decoding flowbus output is built against them.
//!
//! ```text
//! ┌──────────────────────────────┬───────────────────────────┐
//! │ part 1: FlowHeader (3 bytes) │ part 2: payload           │
//! │ len: u16 BE │ source_id: u8  │ (exactly `len` bytes)     │
//! └──────────────────────────────┴───────────────────────────┘
//! ```

/// Size of the encoded header part in bytes
pub const HEADER_SIZE: usize = 3;

/// Largest payload the 16-bit length field can announce
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Number of parts in every published multi-part message
pub const PARTS_PER_MESSAGE: usize = 2;
