//! CLI command implementations.

mod analyze;
mod config;
mod init;

pub use analyze::run_analyze;
pub use config::run_config;
pub use init::run_init;
