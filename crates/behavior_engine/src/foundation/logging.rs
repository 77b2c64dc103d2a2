//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Intended for binaries; libraries and tests rely on the host's logger.
pub fn init() {
    env_logger::init();
}
