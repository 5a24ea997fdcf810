//! # Flowbus Configuration
//!
//! Explicit configuration for the publishing side of the flow pipeline.
//! The host builds a [`FlowbusConfig`] once at startup and hands it to the
//! selected transport driver; nothing here is global or mutable after load.
//!
//! ## Usage
//!
//! ```rust
//! use flowbus_config::FlowbusConfig;
//!
//! let config = FlowbusConfig::from_toml_str(r#"
//! [transport.ntopng]
//! listen = "tcp://127.0.0.1:5556"
//! source_id = 7
//! "#).unwrap();
//!
//! let settings = config.transport.ntopng.resolve().unwrap();
//! assert_eq!(settings.source_id, 7);
//! ```

pub mod endpoint;
pub mod error;
pub mod service_config;

pub use endpoint::{Endpoint, Scheme};
pub use error::ConfigError;
pub use service_config::{
    FlowbusConfig, LoggingConfig, NtopngSettings, PublisherSettings, TransportConfig,
    DEFAULT_DRIVER, DEFAULT_LISTEN, DEFAULT_SOURCE_ID, ENV_PREFIX, NTOPNG_DRIVER,
};
