/// Logger runtime configuration
///
/// Holds the minimum level threshold and the per-tag debug filter set,
/// populated once at startup from command-line arguments. Stored behind a
/// process-wide RwLock so logging call sites stay cheap and lock-free on
/// the write path after init.

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are suppressed (errors always pass)
    pub min_level: LogLevel,
    /// Tags with debug output enabled via --debug-<tag>
    pub debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the logger configuration from the stored command-line arguments
pub fn init_from_args() {
    set_logger_config(config_from_args());
}

/// Assemble the configuration from the flags currently stored in
/// [`crate::arguments`].
///
/// Recognized flags:
/// - `--debug-api`, `--debug-gateway`, `--debug-cache`, `--debug-queue`
///   enable debug output for one subsystem
/// - `--debug-all` enables debug output for every tag
/// - `--verbose` raises the threshold to Verbose
/// - `--quiet` lowers the threshold to Error
/// - `--log-level <level>` sets an explicit threshold
pub fn config_from_args() -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for (key, enabled) in [
        ("api", arguments::is_debug_api_enabled()),
        ("gateway", arguments::is_debug_gateway_enabled()),
        ("cache", arguments::is_debug_cache_enabled()),
        ("queue", arguments::is_debug_queue_enabled()),
        ("all", arguments::has_arg("--debug-all")),
    ] {
        if enabled {
            config.debug_tags.insert(key.to_string());
        }
    }

    if arguments::is_verbose_enabled() {
        config.min_level = LogLevel::Verbose;
    } else if arguments::has_arg("--quiet") {
        config.min_level = LogLevel::Error;
    } else if let Some(value) = arguments::get_arg_value("--log-level") {
        if let Some(level) = LogLevel::parse(&value) {
            config.min_level = level;
        }
    }

    // Debug flags imply at least the Debug threshold
    if !config.debug_tags.is_empty() && config.min_level < LogLevel::Debug {
        config.min_level = LogLevel::Debug;
    }

    config
}

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut guard) = LOGGER_CONFIG.write() {
        *guard = config;
    }
}

/// Whether debug output is enabled for the given tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_tags.contains("all") || config.debug_tags.contains(&tag.to_debug_key())
}
