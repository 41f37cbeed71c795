//! Structured console logging
//!
//! Level-specific functions over tagged messages, with per-subsystem debug
//! gating driven by command-line flags:
//!
//! ```rust,ignore
//! use coinfeed::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Upstream unreachable");
//! logger::info(LogTag::Gateway, "Serving 10 coins from cache");
//! logger::debug(LogTag::Cache, "MISS top_coins_10"); // only with --debug-cache
//! ```
//!
//! Call [`init`] once at startup, after the raw arguments have been stored
//! via [`crate::arguments::set_cmd_args`]; it reads the per-subsystem
//! `--debug-api`/`--debug-gateway`/`--debug-cache`/`--debug-queue` flags
//! plus `--debug-all`, `--verbose`, `--quiet` and `--log-level`.

pub(crate) mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger from stored command-line arguments
pub fn init() {
    config::init_from_args();
}

/// ERROR level, always shown
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// WARNING level, shown unless --quiet
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// INFO level, standard operational messages
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// DEBUG level, shown only with the matching --debug-<tag> flag
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// VERBOSE level, shown only with --verbose
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
