//! Output stage: drives one transport through its lifecycle
//!
//! Record errors drop that record and keep the pipeline running; lifecycle
//! and state errors are returned to the host.

use crate::{DriverMetadata, TransportDriver, TransportError};
use flowbus_config::FlowbusConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Published,
    Dropped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    pub published: u64,
    pub dropped: u64,
}

#[derive(Debug)]
pub struct OutputStage {
    driver: Box<dyn TransportDriver>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl OutputStage {
    pub fn new(driver: Box<dyn TransportDriver>) -> Self {
        Self {
            driver,
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Prepare and bind the driver
    pub fn start(&self, config: &FlowbusConfig) -> Result<(), TransportError> {
        self.driver.prepare(config)?;
        self.driver.init()?;
        info!(driver = self.driver.name(), "Output stage started");
        Ok(())
    }

    /// Publish one record
    pub fn publish(&self, key: &[u8], payload: &[u8]) -> Result<Delivery, TransportError> {
        match self.driver.send(key, payload) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(Delivery::Published)
            }
            Err(e) if e.is_record_error() => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(driver = self.driver.name(), "Dropping record: {}", e);
                Ok(Delivery::Dropped)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the driver and report final counts
    pub fn shutdown(&self) -> Result<StageStats, TransportError> {
        self.driver.close()?;
        let stats = self.stats();
        info!(
            driver = self.driver.name(),
            published = stats.published,
            dropped = stats.dropped,
            "Output stage stopped"
        );
        Ok(stats)
    }

    pub fn stats(&self) -> StageStats {
        StageStats {
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    pub fn driver_metadata(&self) -> DriverMetadata {
        self.driver.metadata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectorDriver;
    use crate::DriverState;

    #[test]
    fn test_stage_lifecycle() {
        let stage = OutputStage::new(Box::new(CollectorDriver::new()));
        stage.start(&FlowbusConfig::default()).unwrap();

        assert_eq!(stage.publish(b"k", b"one").unwrap(), Delivery::Published);
        assert_eq!(stage.publish(b"k", b"two").unwrap(), Delivery::Published);

        let stats = stage.shutdown().unwrap();
        assert_eq!(stats, StageStats { published: 2, dropped: 0 });
        assert_eq!(stage.driver_metadata().state, DriverState::Closed);
    }

    #[test]
    fn test_record_error_dropped() {
        let driver = CollectorDriver::new();
        driver.fail_next_send(TransportError::Oversize {
            size: 70000,
            limit: 65535,
        });
        let stage = OutputStage::new(Box::new(driver));
        stage.start(&FlowbusConfig::default()).unwrap();

        assert_eq!(stage.publish(&[], b"big").unwrap(), Delivery::Dropped);
        assert_eq!(stage.publish(&[], b"next").unwrap(), Delivery::Published);
        assert_eq!(stage.stats(), StageStats { published: 1, dropped: 1 });
    }

    #[test]
    fn test_state_error_propagates() {
        let stage = OutputStage::new(Box::new(CollectorDriver::new()));
        let err = stage.publish(&[], b"early").unwrap_err();
        assert!(matches!(err, TransportError::InvalidState { .. }));
        assert_eq!(stage.stats(), StageStats::default());
    }
}
