//! Publisher Configuration Module
//!
//! Loads the publisher configuration from an optional TOML file with
//! environment overrides (`FLOWBUS__` prefix, `__` between nested keys).

use crate::{ConfigError, Endpoint};
use config_rs::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Registered name of the ZeroMQ publisher whose settings live under `transport.ntopng`
pub const NTOPNG_DRIVER: &str = "ntopng";

/// Driver selected when none is configured
pub const DEFAULT_DRIVER: &str = NTOPNG_DRIVER;

/// Bind address for the publish socket
pub const DEFAULT_LISTEN: &str = "tcp://0.0.0.0:5556";

/// Source id embedded in every header when none is configured
pub const DEFAULT_SOURCE_ID: u64 = 0;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "FLOWBUS";

/// Main publisher configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowbusConfig {
    /// Name of the transport driver the host selects
    pub driver: String,

    /// Per-driver settings
    pub transport: TransportConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    pub ntopng: NtopngSettings,
}

/// Settings for the ZeroMQ publisher consumed by ntopng
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NtopngSettings {
    /// proto://address to bind the publish socket on
    pub listen: String,

    /// Raw source id; range-checked by [`NtopngSettings::resolve`]
    pub source_id: u64,

    /// ZMQ_SNDHWM, messages queued per subscriber before dropping
    pub send_high_water_mark: Option<i32>,

    /// ZMQ_SNDTIMEO in milliseconds, -1 blocks per socket policy
    pub send_timeout_ms: Option<i32>,
}

/// Validated settings handed to the publishing endpoint by value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherSettings {
    pub endpoint: Endpoint,
    pub source_id: u8,
    pub send_high_water_mark: Option<i32>,
    pub send_timeout_ms: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for FlowbusConfig {
    fn default() -> Self {
        Self {
            driver: DEFAULT_DRIVER.to_string(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NtopngSettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            source_id: DEFAULT_SOURCE_ID,
            send_high_water_mark: None,
            send_timeout_ms: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl NtopngSettings {
    /// Validate and convert into the form the publisher binds with
    ///
    /// A source id above 255 is rejected, never truncated.
    pub fn resolve(&self) -> Result<PublisherSettings, ConfigError> {
        let endpoint: Endpoint = self.listen.parse()?;

        let source_id = u8::try_from(self.source_id).map_err(|_| {
            ConfigError::SourceIdOutOfRange {
                value: self.source_id,
            }
        })?;

        if let Some(hwm) = self.send_high_water_mark {
            if hwm < 0 {
                return Err(ConfigError::InvalidSocketOption {
                    option: "send_high_water_mark",
                    reason: format!("{hwm} is negative"),
                });
            }
        }

        if let Some(timeout) = self.send_timeout_ms {
            if timeout < -1 {
                return Err(ConfigError::InvalidSocketOption {
                    option: "send_timeout_ms",
                    reason: format!("{timeout} is below -1"),
                });
            }
        }

        Ok(PublisherSettings {
            endpoint,
            source_id,
            send_high_water_mark: self.send_high_water_mark,
            send_timeout_ms: self.send_timeout_ms,
        })
    }
}

impl FlowbusConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading configuration: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        } else {
            debug!("No configuration file given, using defaults");
        }

        // Override with environment variables (FLOWBUS__ prefix)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(driver = %config.driver, listen = %config.transport.ntopng.listen, "Configuration loaded");
        Ok(config)
    }

    /// Parse configuration from TOML text without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(ConfigError::from)
    }

    /// Eagerly validate everything the selected driver will need
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver == NTOPNG_DRIVER {
            self.transport.ntopng.resolve()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = FlowbusConfig::default();
        assert_eq!(config.driver, "ntopng");
        assert_eq!(config.transport.ntopng.listen, "tcp://0.0.0.0:5556");
        assert_eq!(config.transport.ntopng.source_id, 0);
        assert_eq!(config.logging.level, "info");

        let settings = config.transport.ntopng.resolve().unwrap();
        assert_eq!(settings.endpoint.to_string(), DEFAULT_LISTEN);
        assert_eq!(settings.source_id, 0);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = FlowbusConfig::load_with_env(None, Some(HashMap::new())).unwrap();
        assert_eq!(config, FlowbusConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("flowbus.toml");

        let config_content = r#"
driver = "ntopng"

[transport.ntopng]
listen = "tcp://127.0.0.1:6000"
source_id = 12
send_high_water_mark = 5000

[logging]
level = "debug"
json = true
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = FlowbusConfig::load_with_env(Some(&config_path), Some(HashMap::new())).unwrap();
        assert_eq!(config.transport.ntopng.listen, "tcp://127.0.0.1:6000");
        assert_eq!(config.transport.ntopng.source_id, 12);
        assert_eq!(config.transport.ntopng.send_high_water_mark, Some(5000));
        assert_eq!(config.transport.ntopng.send_timeout_ms, None);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = FlowbusConfig::load_with_env(Some(&missing), Some(HashMap::new())).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("flowbus.toml");
        fs::write(&config_path, "[transport.ntopng]\nsource_id = 1\n").unwrap();

        let env = HashMap::from([
            (
                "FLOWBUS__TRANSPORT__NTOPNG__SOURCE_ID".to_string(),
                "9".to_string(),
            ),
            ("FLOWBUS__DRIVER".to_string(), "stdout".to_string()),
        ]);

        let config = FlowbusConfig::load_with_env(Some(&config_path), Some(env)).unwrap();
        assert_eq!(config.transport.ntopng.source_id, 9);
        assert_eq!(config.driver, "stdout");
    }

    #[test]
    fn test_source_id_out_of_range_rejected() {
        let config = FlowbusConfig::from_toml_str("[transport.ntopng]\nsource_id = 256\n").unwrap();
        assert_eq!(
            config.transport.ntopng.resolve().unwrap_err(),
            ConfigError::SourceIdOutOfRange { value: 256 }
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_id_upper_bound_accepted() {
        let config = FlowbusConfig::from_toml_str("[transport.ntopng]\nsource_id = 255\n").unwrap();
        assert_eq!(config.transport.ntopng.resolve().unwrap().source_id, 255);
    }

    #[test]
    fn test_bad_listen_rejected() {
        let config =
            FlowbusConfig::from_toml_str("[transport.ntopng]\nlisten = \"0.0.0.0:5556\"\n").unwrap();
        assert!(matches!(
            config.transport.ntopng.resolve(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_socket_option_bounds() {
        let mut settings = NtopngSettings::default();
        settings.send_timeout_ms = Some(-1);
        settings.send_high_water_mark = Some(0);
        assert!(settings.resolve().is_ok());

        settings.send_timeout_ms = Some(-2);
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::InvalidSocketOption {
                option: "send_timeout_ms",
                ..
            })
        ));

        settings.send_timeout_ms = None;
        settings.send_high_water_mark = Some(-5);
        assert!(matches!(
            settings.resolve(),
            Err(ConfigError::InvalidSocketOption {
                option: "send_high_water_mark",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_skips_unused_driver_settings() {
        let mut config = FlowbusConfig::default();
        config.driver = "stdout".to_string();
        config.transport.ntopng.source_id = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_checks_ntopng_settings_when_selected() {
        let mut config = FlowbusConfig::default();
        config.driver = NTOPNG_DRIVER.to_string();
        config.transport.ntopng.source_id = 1000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::SourceIdOutOfRange { value: 1000 })
        );

        config.driver = "stdout".to_string();
        assert!(config.validate().is_ok());
    }
}
