//! # Flowbus Transport
//!
//! Output drivers at the tail of the flow pipeline. Each driver takes
//! `(key, payload)` records from the upstream decoder and republishes them.
//!
//! ## Drivers
//! - [`ZmqPublisher`] (`ntopng`): ZeroMQ PUB socket, two-part messages
//!   `[FlowHeader][payload]` as consumed by ntopng
//! - [`StdoutDriver`] (`stdout`): one payload per line
//!
//! ## Lifecycle
//!
//! ```text
//! prepare(config) → init() → send(key, payload)* → close()
//! ```
//!
//! Drivers serialize calls internally; a driver may be shared across
//! threads behind an `Arc`.

pub mod drivers;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod socket;
pub mod stage;
pub mod test_utils;

use flowbus_config::FlowbusConfig;
use std::fmt::Debug;

pub use drivers::{StdoutDriver, ZmqPublisher, NTOPNG_DRIVER, STDOUT_DRIVER};
pub use error::TransportError;
pub use metadata::{DriverMetadata, DriverState};
pub use registry::{DriverConstructor, DriverRegistry};
pub use socket::{BusSocket, PublishSocket};
pub use stage::{Delivery, OutputStage, StageStats};

/// A destination for encoded flow records
pub trait TransportDriver: Send + Sync + Debug {
    /// Registered driver name
    fn name(&self) -> &str;

    /// Record configuration; must not touch the network
    fn prepare(&self, config: &FlowbusConfig) -> Result<(), TransportError>;

    /// Allocate and bind resources
    fn init(&self) -> Result<(), TransportError>;

    /// Publish one record; `key` is accepted for symmetry and may be ignored
    fn send(&self, key: &[u8], payload: &[u8]) -> Result<(), TransportError>;

    /// Release resources; queued records may be lost
    fn close(&self) -> Result<(), TransportError>;

    /// Get driver metadata for debugging/monitoring
    fn metadata(&self) -> DriverMetadata {
        DriverMetadata::new(self.name(), "unknown")
    }

    /// Check if records can currently be sent
    fn is_bound(&self) -> bool {
        self.metadata().state.is_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectorDriver;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_send_requires_init() {
        let driver = CollectorDriver::new();
        assert!(!driver.is_bound());
        assert!(driver.send(&[], b"test").is_err());

        driver.prepare(&FlowbusConfig::default()).unwrap();
        driver.init().unwrap();
        assert!(driver.is_bound());
        driver.send(b"key", b"test").unwrap();

        assert_eq!(driver.records(), vec![(b"key".to_vec(), b"test".to_vec())]);
    }

    #[test]
    fn test_driver_shared_across_threads() {
        let driver: Arc<dyn TransportDriver> = Arc::new(CollectorDriver::new());
        driver.prepare(&FlowbusConfig::default()).unwrap();
        driver.init().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let driver = driver.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        driver.send(&[], format!("{t}-{i}").as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(driver.metadata().messages_sent, 100);
    }
}
