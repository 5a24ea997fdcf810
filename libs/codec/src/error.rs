//! Codec errors for header construction and decoding

use thiserror::Error;

/// Errors raised while building or decoding a [`FlowHeader`](crate::FlowHeader)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Payload cannot be announced by the 16-bit length field
    #[error("Payload too large: {size} bytes exceeds header limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Header part does not have the fixed wire size
    #[error("Invalid header size: expected {expected} bytes, got {got}")]
    HeaderSize { expected: usize, got: usize },

    /// Payload part does not match the length announced by its header
    #[error("Payload length mismatch: header announces {announced} bytes, payload has {actual} (message truncated or corrupted)")]
    LengthMismatch { announced: usize, actual: usize },
}

impl CodecError {
    /// Create a payload-too-large error against the wire limit
    pub fn payload_too_large(size: usize) -> Self {
        Self::PayloadTooLarge {
            size,
            limit: crate::MAX_PAYLOAD_SIZE,
        }
    }
}
