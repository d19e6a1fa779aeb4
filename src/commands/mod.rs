//! Subcommand implementations for herakles-gpu-exporter.

pub mod check;
pub mod config;
pub mod devices;
pub mod test;

pub use check::command_check;
pub use config::command_config;
pub use devices::command_devices;
pub use test::command_test;
