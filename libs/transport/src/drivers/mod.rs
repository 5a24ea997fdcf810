pub mod ntopng;
pub mod stdout;

pub use ntopng::{ZmqPublisher, NTOPNG_DRIVER};
pub use stdout::{StdoutDriver, STDOUT_DRIVER};
