use thiserror::Error;

/// Failure taxonomy for gateway requests.
///
/// `RateLimited` and `Transient` describe a single failed attempt and are
/// candidates for retry; `Exhausted` means the retry budget was spent and is
/// what callers actually see when an operation gives up.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Rate limited by upstream (HTTP 429)")] RateLimited,

    #[error("Transient failure: {0}")] Transient(String),

    #[error("Request exhausted after {attempts} attempts: {last_error}")] Exhausted {
        attempts: u32,
        last_error: String,
    },

    #[error("Request cancelled before dispatch")] Cancelled,

    #[error("Gateway disabled via configuration")] Disabled,

    #[error("Internal gateway error: {0}")] Internal(String),
}

impl FetchError {
    /// Whether another attempt may succeed. Only per-attempt failures
    /// qualify; terminal states (exhausted, cancelled, disabled) do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RateLimited => true,
            FetchError::Transient(_) => true,
            _ => false,
        }
    }

    /// Whether this error carries fallback-eligible exhaustion, i.e. the
    /// request ran its full retry budget against a live upstream.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchError::Exhausted { .. })
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(FetchError::RateLimited.is_retryable());
        assert!(FetchError::Transient("connection reset".to_string()).is_retryable());

        assert!(!FetchError::Cancelled.is_retryable());
        assert!(!FetchError::Disabled.is_retryable());
        assert!(
            !FetchError::Exhausted {
                attempts: 3,
                last_error: "HTTP 502".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn exhausted_message_carries_attempts_and_cause() {
        let err = FetchError::Exhausted {
            attempts: 3,
            last_error: "HTTP 429".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("HTTP 429"));
        assert!(err.is_exhausted());
    }
}
