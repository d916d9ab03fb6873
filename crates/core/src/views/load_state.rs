use crate::errors::CoreError;

/// What a data-backed panel is showing. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    /// User-facing message; the underlying error has been logged
    Error(String),
    Empty,
    Loaded(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// Stable identifiers for every panel state a renderer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMarker {
    RulesLoading,
    RulesLoadError,
    NoRulesFound,
    RuleList,
    DayByDayLoading,
    DayByDayError,
    DayByDayEmpty,
    DayByDayChart,
}

impl ViewMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMarker::RulesLoading => "rules-loading",
            ViewMarker::RulesLoadError => "rules-load-error",
            ViewMarker::NoRulesFound => "no-rules-found",
            ViewMarker::RuleList => "rule-list",
            ViewMarker::DayByDayLoading => "daybyday-loading",
            ViewMarker::DayByDayError => "daybyday-error",
            ViewMarker::DayByDayEmpty => "daybyday-empty",
            ViewMarker::DayByDayChart => "daybyday-chart",
        }
    }
}

impl std::fmt::Display for ViewMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `LoadState` plus the generation of the newest request.
///
/// `begin` hands out a generation; `finish` only applies a result whose
/// generation is still the newest, so a slow response can never overwrite
/// the answer to a later request.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    state: LoadState<T>,
    latest: u64,
}

impl<T> Tracked<T> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            latest: 0,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    /// Enter `Loading` and return the generation the response must carry.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.state = LoadState::Loading;
        self.latest
    }

    /// Apply a response. Returns `false` (and changes nothing) when the
    /// response belongs to a superseded request.
    pub fn finish(
        &mut self,
        generation: u64,
        result: Result<T, CoreError>,
        is_empty: impl FnOnce(&T) -> bool,
        error_message: &str,
    ) -> bool {
        if generation != self.latest {
            tracing::debug!(generation, latest = self.latest, "dropping stale response");
            return false;
        }
        self.state = match result {
            Ok(data) if is_empty(&data) => LoadState::Empty,
            Ok(data) => LoadState::Loaded(data),
            Err(e) => {
                tracing::error!(error = %e, "load failed");
                LoadState::Error(error_message.to_string())
            }
        };
        true
    }
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self::new()
    }
}
