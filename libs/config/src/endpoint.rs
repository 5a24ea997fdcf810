//! Bus endpoint connection strings (`<transport>://<address>`)

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transports a publish socket can bind on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Tcp,
    Ipc,
    Inproc,
    Pgm,
    Epgm,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Ipc => "ipc",
            Scheme::Inproc => "inproc",
            Scheme::Pgm => "pgm",
            Scheme::Epgm => "epgm",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tcp" => Some(Scheme::Tcp),
            "ipc" => Some(Scheme::Ipc),
            "inproc" => Some(Scheme::Inproc),
            "pgm" => Some(Scheme::Pgm),
            "epgm" => Some(Scheme::Epgm),
            _ => None,
        }
    }
}

/// A parsed bind address such as `tcp://0.0.0.0:5556`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: Scheme,
    address: String,
}

impl Endpoint {
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (scheme, address) = raw
            .split_once("://")
            .ok_or_else(|| ConfigError::invalid_endpoint(raw, "expected <transport>://<address>"))?;

        let scheme = Scheme::parse(scheme).ok_or_else(|| {
            ConfigError::invalid_endpoint(
                raw,
                format!("unsupported transport '{scheme}' (tcp, ipc, inproc, pgm, epgm)"),
            )
        })?;

        if address.is_empty() {
            return Err(ConfigError::invalid_endpoint(raw, "empty address"));
        }

        if scheme == Scheme::Tcp {
            let (host, port) = address
                .rsplit_once(':')
                .ok_or_else(|| ConfigError::invalid_endpoint(raw, "tcp address needs a :port"))?;
            if host.is_empty() {
                return Err(ConfigError::invalid_endpoint(raw, "tcp address needs a host or *"));
            }
            if port != "*" && port.parse::<u16>().is_err() {
                return Err(ConfigError::invalid_endpoint(
                    raw,
                    format!("invalid port '{port}'"),
                ));
            }
        }

        Ok(Self {
            scheme,
            address: address.to_string(),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.address)
    }
}
