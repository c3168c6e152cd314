/// fern dispatch setup and log file housekeeping.
pub mod logger;

pub use logger::{cleanup_old_logs, parse_level, setup_logging};
