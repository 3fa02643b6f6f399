/// Installs the global `tracing` subscriber (console plus optional rolling JSON file).
pub mod setup;

pub use setup::{setup_logging, LogSettings};
