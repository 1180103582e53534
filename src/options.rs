use std::time::Duration;

/// Per-attempt timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configures the base URL, debug dumps, and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Origin and prefix prepended verbatim to every endpoint.
    pub base_url: String,
    /// Emits request/response dumps to the debug sink when set.
    pub debug: bool,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Fixed delay between consecutive attempts.
    pub retry_delay: Duration,
    /// Per-attempt timeout applied by the transport.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts a failing request will make.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            debug: false,
            max_retries: 0,
            retry_delay: Duration::ZERO,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
