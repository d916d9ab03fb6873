use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use super::chart::Horizon;
use crate::errors::CoreError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// Client settings: where the backend lives and how the plan page starts out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Backend base URL, without the `/api/...` suffix (e.g., "https://moneywise.example").
    pub base_url: String,

    /// Per-request timeout (native targets only; browsers manage their own).
    pub request_timeout_secs: u64,

    /// Horizon the projection view opens with.
    pub default_horizon: Horizon,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS as u64,
            default_horizon: Horizon::default(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with `MONEYWISE_BASE_URL`, `MONEYWISE_REQUEST_TIMEOUT_SECS`
    /// and `MONEYWISE_DEFAULT_HORIZON` from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_environment(Environment::with_prefix("MONEYWISE"))
    }

    /// Defaults overlaid with an explicit environment source.
    pub fn from_environment(env: Environment) -> Result<Self, CoreError> {
        let settings: Settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("default_horizon", Horizon::default().label())?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validated()
    }

    /// Reject settings the client cannot work with and normalise the base URL.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CoreError::Config("base URL must not be empty".into()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "base URL must start with http:// or https://, got {trimmed:?}"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}
