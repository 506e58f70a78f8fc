/// Fern-based logging setup with log-file rotation.
pub mod logsetup;

pub use logsetup::setup_logging;
