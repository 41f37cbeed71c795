/// Log tags identifying the originating subsystem
///
/// Each tag maps to a `--debug-<tag>` command-line flag that enables
/// debug-level output for that subsystem only.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    /// Startup, shutdown, top-level orchestration
    System,
    /// Configuration loading and validation
    Config,
    /// Upstream HTTP transport
    Api,
    /// Domain operations and cache-key handling
    Gateway,
    /// Response cache hits/misses/expiry
    Cache,
    /// Scheduler worker and pacing
    Queue,
    /// Degraded-mode synthetic data
    Fallback,
    /// Test-only output
    Test,
    /// Escape hatch for ad-hoc tags
    Other(String),
}

impl LogTag {
    /// Key used in `--debug-<key>` flags and filter sets
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Gateway => "gateway".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Queue => "queue".to_string(),
            LogTag::Fallback => "fallback".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored display name, used for width-aligned console output
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Api => "API".to_string(),
            LogTag::Gateway => "GATEWAY".to_string(),
            LogTag::Cache => "CACHE".to_string(),
            LogTag::Queue => "QUEUE".to_string(),
            LogTag::Fallback => "FALLBACK".to_string(),
            LogTag::Test => "TEST".to_string(),
            LogTag::Other(name) => name.to_uppercase(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
