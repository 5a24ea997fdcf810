//! Test doubles for drivers and sockets

use crate::socket::PublishSocket;
use crate::{DriverMetadata, DriverState, TransportDriver, TransportError};
use flowbus_config::FlowbusConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Parts seen by a [`ScriptedSocket`]: bytes plus the "more" flag
pub type RecordedParts = Arc<Mutex<Vec<(Vec<u8>, bool)>>>;

/// Scripted result for one `send_part` call
#[derive(Debug, Clone, Copy)]
pub enum SendOutcome {
    /// Accept the whole part
    Accept,
    /// Report only this many bytes accepted
    Short(usize),
    /// Reject the part
    Fail(zmq::Error),
}

/// A socket that records parts and replays scripted outcomes
///
/// Once the script runs out every part is accepted.
#[derive(Debug, Default)]
pub struct ScriptedSocket {
    outcomes: VecDeque<SendOutcome>,
    parts: RecordedParts,
    closed: Arc<AtomicBool>,
}

impl ScriptedSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = SendOutcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Handle to the recorded parts, usable after the socket is boxed
    pub fn parts(&self) -> RecordedParts {
        self.parts.clone()
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl PublishSocket for ScriptedSocket {
    fn send_part(&mut self, part: &[u8], more: bool) -> Result<usize, zmq::Error> {
        self.parts.lock().push((part.to_vec(), more));
        match self.outcomes.pop_front().unwrap_or(SendOutcome::Accept) {
            SendOutcome::Accept => Ok(part.len()),
            SendOutcome::Short(written) => Ok(written),
            SendOutcome::Fail(err) => Err(err),
        }
    }

    fn close(self: Box<Self>) -> Result<(), zmq::Error> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Cloneable in-memory writer
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A driver that collects `(key, payload)` records for assertions
#[derive(Debug)]
pub struct CollectorDriver {
    records: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
    state: Mutex<DriverState>,
    fail_next: Mutex<Option<TransportError>>,
    metadata: Mutex<DriverMetadata>,
}

impl CollectorDriver {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            state: Mutex::new(DriverState::Unconfigured),
            fail_next: Mutex::new(None),
            metadata: Mutex::new(DriverMetadata::new("collector", "collector")),
        }
    }

    /// Fail the next send with `err`
    pub fn fail_next_send(&self, err: TransportError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn records(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.records.lock().clone()
    }

    fn transition(
        &self,
        operation: &'static str,
        from: DriverState,
        to: DriverState,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if *state != from {
            return Err(TransportError::invalid_state(operation, *state));
        }
        *state = to;
        Ok(())
    }
}

impl Default for CollectorDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportDriver for CollectorDriver {
    fn name(&self) -> &str {
        "collector"
    }

    fn prepare(&self, _config: &FlowbusConfig) -> Result<(), TransportError> {
        self.transition("prepare", DriverState::Unconfigured, DriverState::Configured)
    }

    fn init(&self) -> Result<(), TransportError> {
        self.transition("init", DriverState::Configured, DriverState::Bound)
    }

    fn send(&self, key: &[u8], payload: &[u8]) -> Result<(), TransportError> {
        let state = *self.state.lock();
        if state != DriverState::Bound {
            return Err(TransportError::invalid_state("send", state));
        }
        if let Some(err) = self.fail_next.lock().take() {
            self.metadata.lock().record_failure(err.to_string());
            return Err(err);
        }
        self.records.lock().push((key.to_vec(), payload.to_vec()));
        self.metadata.lock().record_success();
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        self.transition("close", DriverState::Bound, DriverState::Closed)
    }

    fn metadata(&self) -> DriverMetadata {
        let mut metadata = self.metadata.lock().clone();
        metadata.state = *self.state.lock();
        metadata
    }
}
