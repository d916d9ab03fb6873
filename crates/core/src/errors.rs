use thiserror::Error;

/// Unified error type for the entire moneywise-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client-side validation ──────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({endpoint}, status {status}): {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid projection series: {0}")]
    InvalidSeries(String),

    // ── Session / Setup ─────────────────────────────────────────────
    #[error("Not authenticated — log in to see your plan")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// True for errors raised before any request left the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::InvalidRecurrence(_))
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Every backend URL carries `userid=` in its query string; keep it out of logs.
        CoreError::Network(redact_query(&e.to_string()))
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(e: config::ConfigError) -> Self {
        CoreError::Config(e.to_string())
    }
}

/// Replace everything after the first `?` with a placeholder.
pub(crate) fn redact_query(msg: &str) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg.to_string(),
    }
}
