//! Line-oriented driver for running a pipeline without a bus
//!
//! Writes each payload followed by `\n`. No header is emitted; the
//! payloads are expected to be self-delimiting records such as JSON.

use crate::{DriverMetadata, DriverState, TransportDriver, TransportError};
use flowbus_config::FlowbusConfig;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Registered name of this driver
pub const STDOUT_DRIVER: &str = "stdout";

struct StdoutInner {
    state: DriverState,
    writer: Box<dyn Write + Send>,
    metadata: DriverMetadata,
}

pub struct StdoutDriver {
    inner: Mutex<StdoutInner>,
}

impl StdoutDriver {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Write records to any sink instead of the process stdout
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(StdoutInner {
                state: DriverState::Unconfigured,
                writer: Box::new(writer),
                metadata: DriverMetadata::new(STDOUT_DRIVER, "stdout"),
            }),
        }
    }

    fn transition(
        &self,
        operation: &'static str,
        from: DriverState,
        to: DriverState,
    ) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != from {
            return Err(TransportError::invalid_state(operation, inner.state));
        }
        inner.state = to;
        debug!(driver = STDOUT_DRIVER, state = %to, "Driver {}", operation);
        Ok(())
    }
}

impl Default for StdoutDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdoutDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdoutDriver")
            .field("state", &self.inner.lock().state)
            .finish_non_exhaustive()
    }
}

impl TransportDriver for StdoutDriver {
    fn name(&self) -> &str {
        STDOUT_DRIVER
    }

    fn prepare(&self, _config: &FlowbusConfig) -> Result<(), TransportError> {
        self.transition("prepare", DriverState::Unconfigured, DriverState::Configured)
    }

    fn init(&self) -> Result<(), TransportError> {
        self.transition("init", DriverState::Configured, DriverState::Bound)
    }

    fn send(&self, _key: &[u8], payload: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Bound {
            return Err(TransportError::invalid_state("send", inner.state));
        }

        let StdoutInner {
            writer, metadata, ..
        } = &mut *inner;
        let written = writer
            .write_all(payload)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());

        match written {
            Ok(()) => {
                metadata.record_success();
                Ok(())
            }
            Err(e) => {
                warn!(driver = STDOUT_DRIVER, "Record not written: {}", e);
                metadata.record_failure(e.to_string());
                Err(e.into())
            }
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Bound {
            return Err(TransportError::invalid_state("close", inner.state));
        }
        inner.state = DriverState::Closed;
        inner.writer.flush()?;
        Ok(())
    }

    fn metadata(&self) -> DriverMetadata {
        let inner = self.inner.lock();
        let mut metadata = inner.metadata.clone();
        metadata.state = inner.state;
        metadata
    }
}
