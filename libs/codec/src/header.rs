//! Flow Header Implementation
//!
//! The header is built fresh for every published record and discarded once
//! serialized. It owns no resources.

use crate::{CodecError, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use std::fmt;
use zerocopy::byteorder::network_endian::U16;
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

/// Flow Header (3 bytes)
///
/// ```text
/// byte 0-1: payload_length (u16, network byte order)
/// byte 2:   source_id      (u8)
/// ```
///
/// **CRITICAL**: the struct is `Unaligned` so its in-memory layout is exactly
/// the wire layout. DO NOT add fields without bumping every subscriber.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct FlowHeader {
    payload_length: U16,
    source_id: u8,
}

const _: () = assert!(std::mem::size_of::<FlowHeader>() == HEADER_SIZE);

impl FlowHeader {
    /// Header size in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header from already-range-checked fields
    ///
    /// The caller is responsible for `payload_length` matching the payload
    /// that follows on the wire.
    pub fn new(payload_length: u16, source_id: u8) -> Self {
        Self {
            payload_length: U16::new(payload_length),
            source_id,
        }
    }

    /// Create the header announcing `payload`
    ///
    /// Fails when the payload is longer than the 16-bit length field can
    /// represent; the length is never narrowed.
    pub fn for_payload(payload: &[u8], source_id: u8) -> Result<Self, CodecError> {
        let length =
            u16::try_from(payload.len()).map_err(|_| CodecError::payload_too_large(payload.len()))?;
        Ok(Self::new(length, source_id))
    }

    /// Serialize to the 3-byte wire form
    ///
    /// Deterministic and infallible: fixed-width integers always encode.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Decode a header part received from the bus
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::read_from(bytes).ok_or(CodecError::HeaderSize {
            expected: HEADER_SIZE,
            got: bytes.len(),
        })
    }

    /// Check that `payload` is exactly as long as announced
    pub fn validate_payload(&self, payload: &[u8]) -> Result<(), CodecError> {
        let announced = self.payload_length() as usize;
        if announced != payload.len() {
            return Err(CodecError::LengthMismatch {
                announced,
                actual: payload.len(),
            });
        }
        Ok(())
    }

    /// Announced payload length in bytes
    pub fn payload_length(&self) -> u16 {
        self.payload_length.get()
    }

    /// Identifier of the collector instance that produced the record
    pub fn source_id(&self) -> u8 {
        self.source_id
    }

    /// Whether the announced length is the largest the field can carry
    pub fn is_at_limit(&self) -> bool {
        self.payload_length() as usize == MAX_PAYLOAD_SIZE
    }
}

impl fmt::Display for FlowHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "len={} source={}", self.payload_length(), self.source_id)
    }
}
