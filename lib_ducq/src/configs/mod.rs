//! # Configuration Modules
//!
//! Layered client configuration: built-in defaults, then an optional JSON file,
//! then environment variables and command line flags.

/// Options, file loading and the resolved `ClientConfig`.
pub mod config_client;

pub use config_client::{load_config_from, ClientConfig, ConfigArgs};
