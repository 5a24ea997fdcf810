//! Publish socket seam
//!
//! The publisher only needs to push parts and learn how many bytes were
//! accepted. [`BusSocket`] is the ZeroMQ PUB implementation; tests script
//! their own sockets through the same trait.

use crate::TransportError;
use flowbus_config::PublisherSettings;
use std::fmt;
use tracing::debug;

/// One side of a multi-part publish
pub trait PublishSocket: Send + fmt::Debug {
    /// Send one part; `more` marks that further parts of the same message follow.
    /// Returns the number of bytes the socket accepted.
    fn send_part(&mut self, part: &[u8], more: bool) -> Result<usize, zmq::Error>;

    /// Address the socket is actually bound to
    fn last_endpoint(&self) -> Option<String> {
        None
    }

    /// Release the socket; queued parts may be dropped
    fn close(self: Box<Self>) -> Result<(), zmq::Error>;
}

/// ZeroMQ PUB socket with its owning context
pub struct BusSocket {
    socket: zmq::Socket,
    _context: zmq::Context,
    endpoint: String,
}

impl BusSocket {
    /// Allocate a context and PUB socket, apply options, bind
    ///
    /// Every resource built before a failure is dropped on return.
    pub fn bind(settings: &PublisherSettings) -> Result<Self, TransportError> {
        let context = zmq::Context::new();
        let socket = context
            .socket(zmq::PUB)
            .map_err(|source| TransportError::Context { source })?;

        if let Some(hwm) = settings.send_high_water_mark {
            socket
                .set_sndhwm(hwm)
                .map_err(|source| TransportError::SocketOption {
                    option: "ZMQ_SNDHWM",
                    source,
                })?;
        }

        if let Some(timeout) = settings.send_timeout_ms {
            socket
                .set_sndtimeo(timeout)
                .map_err(|source| TransportError::SocketOption {
                    option: "ZMQ_SNDTIMEO",
                    source,
                })?;
        }

        let requested = settings.endpoint.to_string();
        socket.bind(&requested).map_err(|source| TransportError::Bind {
            endpoint: requested.clone(),
            source,
        })?;

        // Wildcard ports resolve only after bind
        let endpoint = match socket.get_last_endpoint() {
            Ok(Ok(endpoint)) => endpoint,
            _ => requested,
        };
        debug!(endpoint = %endpoint, "PUB socket bound");

        Ok(Self {
            socket,
            _context: context,
            endpoint,
        })
    }
}

impl fmt::Debug for BusSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusSocket")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PublishSocket for BusSocket {
    fn send_part(&mut self, part: &[u8], more: bool) -> Result<usize, zmq::Error> {
        let flags = if more { zmq::SNDMORE } else { 0 };
        self.socket.send(part, flags)?;
        Ok(part.len())
    }

    fn last_endpoint(&self) -> Option<String> {
        Some(self.endpoint.clone())
    }

    fn close(self: Box<Self>) -> Result<(), zmq::Error> {
        // No draining on close
        self.socket.set_linger(0)?;
        Ok(())
    }
}
