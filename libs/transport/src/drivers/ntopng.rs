//! ZeroMQ publisher in the framing ntopng subscribes to
//!
//! Every record leaves as one two-part message: the 3-byte [`FlowHeader`]
//! flagged "more", then the payload. Both parts go out under a single lock
//! so concurrent callers can never split a header from its payload.

use crate::socket::{BusSocket, PublishSocket};
use crate::{DriverMetadata, DriverState, TransportDriver, TransportError};
use flowbus_codec::{FlowHeader, HEADER_SIZE};
use flowbus_config::{FlowbusConfig, NtopngSettings, PublisherSettings};
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

pub use flowbus_config::NTOPNG_DRIVER;

#[derive(Debug, Default)]
struct PublisherInner {
    state: DriverState,
    /// Recorded by prepare, validated by init
    pending: Option<NtopngSettings>,
    settings: Option<PublisherSettings>,
    socket: Option<Box<dyn PublishSocket>>,
    metadata: DriverMetadata,
}

/// Publishing endpoint owning one bound PUB socket
#[derive(Debug)]
pub struct ZmqPublisher {
    name: String,
    inner: Mutex<PublisherInner>,
}

impl ZmqPublisher {
    pub fn new() -> Self {
        Self::with_name(NTOPNG_DRIVER)
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let inner = PublisherInner {
            metadata: DriverMetadata::new(name.clone(), "zmq-pub"),
            ..PublisherInner::default()
        };
        Self {
            name,
            inner: Mutex::new(inner),
        }
    }

    /// Wrap a socket the caller already bound; starts in `Bound`
    pub fn bound(
        name: impl Into<String>,
        settings: PublisherSettings,
        socket: Box<dyn PublishSocket>,
    ) -> Self {
        let publisher = Self::with_name(name);
        {
            let mut inner = publisher.inner.lock();
            inner.metadata.endpoint = socket
                .last_endpoint()
                .or_else(|| Some(settings.endpoint.to_string()));
            inner.settings = Some(settings);
            inner.socket = Some(socket);
            inner.state = DriverState::Bound;
        }
        publisher
    }

    /// Record settings by value; touches no network resources
    pub fn configure(&self, settings: NtopngSettings) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Unconfigured {
            return Err(TransportError::invalid_state("prepare", inner.state));
        }
        debug!(driver = %self.name, listen = %settings.listen, source_id = settings.source_id, "Publisher configured");
        inner.pending = Some(settings);
        inner.state = DriverState::Configured;
        Ok(())
    }

    /// Address actually bound, with wildcard ports resolved
    pub fn last_endpoint(&self) -> Option<String> {
        self.inner.lock().metadata.endpoint.clone()
    }

    pub fn state(&self) -> DriverState {
        self.inner.lock().state
    }

    fn bind(pending: Option<NtopngSettings>) -> Result<(PublisherSettings, BusSocket), TransportError> {
        let settings = pending.unwrap_or_default().resolve()?;
        let socket = BusSocket::bind(&settings)?;
        Ok((settings, socket))
    }
}

impl Default for ZmqPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl PublisherInner {
    fn publish(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let source_id = self.settings.as_ref().map(|s| s.source_id).unwrap_or_default();
        let header = FlowHeader::for_payload(payload, source_id)?;
        let header_bytes = header.to_bytes();

        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| TransportError::invalid_state("send", DriverState::Closed))?;

        let written = socket
            .send_part(&header_bytes, true)
            .map_err(|source| TransportError::HeaderSend { source })?;
        if written != HEADER_SIZE {
            return Err(TransportError::ShortWrite {
                expected: HEADER_SIZE,
                written,
            });
        }

        socket
            .send_part(payload, false)
            .map_err(|source| TransportError::PartialSend {
                payload_len: payload.len(),
                source,
            })?;

        debug!(header = %header, "Record published");
        Ok(())
    }
}

impl TransportDriver for ZmqPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, config: &FlowbusConfig) -> Result<(), TransportError> {
        self.configure(config.transport.ntopng.clone())
    }

    fn init(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Configured {
            return Err(TransportError::invalid_state("init", inner.state));
        }

        let pending = inner.pending.take();
        match Self::bind(pending) {
            Ok((settings, socket)) => {
                let endpoint = socket.last_endpoint();
                info!(
                    driver = %self.name,
                    endpoint = endpoint.as_deref().unwrap_or_default(),
                    source_id = settings.source_id,
                    "Publisher bound"
                );
                inner.metadata.endpoint = endpoint;
                inner.settings = Some(settings);
                inner.socket = Some(Box::new(socket));
                inner.state = DriverState::Bound;
                Ok(())
            }
            Err(e) => {
                error!(driver = %self.name, "Publisher init failed: {}", e);
                inner.metadata.last_error = Some(e.to_string());
                inner.state = DriverState::Failed;
                Err(e)
            }
        }
    }

    fn send(&self, key: &[u8], payload: &[u8]) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Bound {
            return Err(TransportError::invalid_state("send", inner.state));
        }
        // The key is not part of the wire format
        trace!(key_len = key.len(), payload_len = payload.len(), "Publishing record");

        match inner.publish(payload) {
            Ok(()) => {
                inner.metadata.record_success();
                Ok(())
            }
            Err(e) => {
                warn!(driver = %self.name, "Record not published: {}", e);
                inner.metadata.record_failure(e.to_string());
                Err(e)
            }
        }
    }

    fn close(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != DriverState::Bound {
            return Err(TransportError::invalid_state("close", inner.state));
        }

        inner.state = DriverState::Closed;
        if let Some(socket) = inner.socket.take() {
            socket
                .close()
                .map_err(|source| TransportError::Close { source })?;
        }
        info!(
            driver = %self.name,
            sent = inner.metadata.messages_sent,
            failed = inner.metadata.messages_failed,
            "Publisher closed"
        );
        Ok(())
    }

    fn metadata(&self) -> DriverMetadata {
        let inner = self.inner.lock();
        let mut metadata = inner.metadata.clone();
        metadata.state = inner.state;
        metadata
    }
}
