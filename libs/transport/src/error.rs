use flowbus_codec::CodecError;
use flowbus_config::ConfigError;
use crate::DriverState;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    #[error("Failed to allocate messaging context: {source}")]
    Context {
        #[source]
        source: zmq::Error,
    },

    #[error("Failed to set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: zmq::Error,
    },

    #[error("Payload too large: {size}B exceeds header limit of {limit}B")]
    Oversize { size: usize, limit: usize },

    #[error("Framing error: {0}")]
    Framing(CodecError),

    #[error("Short header write: expected {expected} bytes, socket accepted {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("Header part rejected by socket: {source}")]
    HeaderSend {
        #[source]
        source: zmq::Error,
    },

    #[error("Payload send failed after header ({payload_len}B), message truncated on the wire: {source}")]
    PartialSend {
        payload_len: usize,
        #[source]
        source: zmq::Error,
    },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: DriverState,
    },

    #[error("Failed to close socket: {source}")]
    Close {
        #[source]
        source: zmq::Error,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Unknown transport driver '{name}' (available: {})", .available.join(", "))]
    UnknownDriver { name: String, available: Vec<String> },
}

impl TransportError {
    /// Errors that abort startup; never retried
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            TransportError::Config(_)
                | TransportError::Bind { .. }
                | TransportError::Context { .. }
                | TransportError::SocketOption { .. }
                | TransportError::UnknownDriver { .. }
        )
    }

    /// Errors that lose a single record; the pipeline keeps going
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            TransportError::Oversize { .. }
                | TransportError::Framing(_)
                | TransportError::ShortWrite { .. }
                | TransportError::HeaderSend { .. }
                | TransportError::PartialSend { .. }
        )
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: &'static str, state: DriverState) -> Self {
        TransportError::InvalidState { operation, state }
    }
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::PayloadTooLarge { size, limit } => TransportError::Oversize { size, limit },
            CodecError::HeaderSize { .. } | CodecError::LengthMismatch { .. } => {
                TransportError::Framing(err)
            }
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}
