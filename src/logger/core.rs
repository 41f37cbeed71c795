/// Central filtering and dispatch for log messages
///
/// Filtering rules:
/// 1. Errors always pass
/// 2. Anything above the minimum level threshold is dropped
/// 3. Debug requires the --debug-<tag> flag for that tag
/// 4. Verbose requires the --verbose flag

use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();
    if level > config.min_level {
        return false;
    }

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(tag) || config.min_level == LogLevel::Verbose;
    }

    true
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}
