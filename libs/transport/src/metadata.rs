use std::fmt;

/// Lifecycle of a transport driver
///
/// ```text
/// Unconfigured --prepare--> Configured --init--> Bound --close--> Closed
///                                          \
///                                           `--(init fails)--> Failed
/// ```
///
/// There is no way back; a `Failed` or `Closed` driver is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Unconfigured,
    Configured,
    Bound,
    Closed,
    Failed,
}

impl DriverState {
    /// Check if records can be sent
    pub fn is_bound(&self) -> bool {
        matches!(self, DriverState::Bound)
    }

    /// Check if the driver reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::Closed | DriverState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Unconfigured => "unconfigured",
            DriverState::Configured => "configured",
            DriverState::Bound => "bound",
            DriverState::Closed => "closed",
            DriverState::Failed => "failed",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about a driver for monitoring/debugging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverMetadata {
    /// Registered driver name
    pub name: String,

    /// Driver type (zmq-pub, stdout, collector, ...)
    pub driver_type: String,

    /// Bound endpoint if applicable
    pub endpoint: Option<String>,

    pub state: DriverState,

    /// Records sent successfully
    pub messages_sent: u64,

    /// Records failed to send
    pub messages_failed: u64,

    /// Last error if any
    pub last_error: Option<String>,
}

impl DriverMetadata {
    /// Create new metadata with name and type
    pub fn new(name: impl Into<String>, driver_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver_type: driver_type.into(),
            ..Self::default()
        }
    }

    /// Record successful send
    pub fn record_success(&mut self) {
        self.messages_sent += 1;
    }

    /// Record failed send
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.messages_failed += 1;
        self.last_error = Some(error.into());
    }

    /// Fraction of sends that failed, None before the first send
    pub fn error_rate(&self) -> Option<f64> {
        let total = self.messages_sent + self.messages_failed;
        if total == 0 {
            return None;
        }
        Some(self.messages_failed as f64 / total as f64)
    }
}
