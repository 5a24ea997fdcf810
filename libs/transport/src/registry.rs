//! Driver selection by name
//!
//! The host builds a registry, picks a driver from configuration and owns it.
//! Nothing registers itself at load time.

use crate::drivers::{StdoutDriver, ZmqPublisher, NTOPNG_DRIVER, STDOUT_DRIVER};
use crate::{TransportDriver, TransportError};
use std::collections::BTreeMap;

/// Builds a fresh, unconfigured driver
pub type DriverConstructor = fn() -> Box<dyn TransportDriver>;

#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    constructors: BTreeMap<String, DriverConstructor>,
}

impl DriverRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `ntopng` and `stdout` drivers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NTOPNG_DRIVER, || Box::new(ZmqPublisher::new()));
        registry.register(STDOUT_DRIVER, || Box::new(StdoutDriver::new()));
        registry
    }

    /// Register or replace a driver constructor
    pub fn register(&mut self, name: impl Into<String>, constructor: DriverConstructor) {
        let name = name.into();
        if self.constructors.insert(name.clone(), constructor).is_some() {
            tracing::debug!("Replaced transport driver '{}'", name);
        }
    }

    /// Construct the driver registered under `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn TransportDriver>, TransportError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| TransportError::UnknownDriver {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })?;
        tracing::info!("Selected transport driver '{}'", name);
        Ok(constructor())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectorDriver;
    use crate::DriverState;

    #[test]
    fn test_defaults_registered() {
        let registry = DriverRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["ntopng", "stdout"]);

        let driver = registry.create("ntopng").unwrap();
        assert_eq!(driver.name(), "ntopng");
        assert_eq!(driver.metadata().state, DriverState::Unconfigured);
    }

    #[test]
    fn test_unknown_driver() {
        let registry = DriverRegistry::with_defaults();
        let err = registry.create("kafka").unwrap_err();

        assert!(err.is_lifecycle());
        assert_eq!(
            err.to_string(),
            "Unknown transport driver 'kafka' (available: ntopng, stdout)"
        );
    }

    #[test]
    fn test_register_custom() {
        let mut registry = DriverRegistry::new();
        assert!(!registry.contains("collector"));

        registry.register("collector", || Box::new(CollectorDriver::new()));
        assert!(registry.contains("collector"));
        assert_eq!(registry.create("collector").unwrap().name(), "collector");
    }
}
