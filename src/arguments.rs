/// Centralized command-line argument handling
///
/// Stores the raw process arguments once so subsystems that cannot see the
/// parsed CLI structure (the logger in particular) can still check for
/// flags. Binaries and tests may override the stored set.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Override the stored arguments (binaries and tests)
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Copy of the current arguments; falls back to env::args on a poisoned lock
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Whether a specific flag is present
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following a flag, if both are present
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG HELPERS
// =============================================================================

/// Upstream HTTP transport debug mode
pub fn is_debug_api_enabled() -> bool {
    has_arg("--debug-api")
}

/// Domain operation debug mode
pub fn is_debug_gateway_enabled() -> bool {
    has_arg("--debug-gateway")
}

/// Response cache debug mode
pub fn is_debug_cache_enabled() -> bool {
    has_arg("--debug-cache")
}

/// Scheduler worker debug mode
pub fn is_debug_queue_enabled() -> bool {
    has_arg("--debug-queue")
}

/// Verbose trace output
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::config_from_args;
    use crate::logger::LogLevel;

    // Single test because the stored arguments are process-global and
    // tests run on parallel threads.
    #[test]
    fn arg_lookup_helpers() {
        set_cmd_args(vec![
            "coinfeed".to_string(),
            "--debug-cache".to_string(),
            "--log-level".to_string(),
            "warning".to_string(),
        ]);

        assert!(has_arg("--debug-cache"));
        assert!(!has_arg("--debug-api"));
        assert_eq!(get_arg_value("--log-level").as_deref(), Some("warning"));
        assert_eq!(get_arg_value("--missing"), None);

        assert!(is_debug_cache_enabled());
        assert!(!is_debug_api_enabled());
        assert!(!is_debug_gateway_enabled());
        assert!(!is_debug_queue_enabled());
        assert!(!is_verbose_enabled());

        // The flag helpers are what the logger configuration is built from
        let config = config_from_args();
        assert!(config.debug_tags.contains("cache"));
        assert!(!config.debug_tags.contains("api"));
        assert_eq!(config.min_level, LogLevel::Debug);

        set_cmd_args(vec!["coinfeed".to_string(), "--verbose".to_string()]);
        assert!(is_verbose_enabled());
        let config = config_from_args();
        assert!(config.debug_tags.is_empty());
        assert_eq!(config.min_level, LogLevel::Verbose);

        set_cmd_args(vec!["coinfeed".to_string()]);
    }
}
