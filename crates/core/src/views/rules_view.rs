use super::load_state::{LoadState, Tracked, ViewMarker};
use crate::errors::CoreError;
use crate::models::rule::{Rule, RuleId};
use crate::services::rule_service::RuleService;

pub const RULES_ERROR_MESSAGE: &str =
    "Oops! Looks like we can't get your rules right now. Try reloading the page.";
pub const NO_RULES_MESSAGE: &str = "You have no rules.";

/// The rule list panel: load state plus the rules sorted by value.
pub struct RulesView {
    rules: Tracked<Vec<Rule>>,
    rule_service: RuleService,
}

impl RulesView {
    pub fn new() -> Self {
        Self {
            rules: Tracked::new(),
            rule_service: RuleService::new(),
        }
    }

    pub fn state(&self) -> &LoadState<Vec<Rule>> {
        self.rules.state()
    }

    pub fn marker(&self) -> ViewMarker {
        match self.rules.state() {
            LoadState::Loading => ViewMarker::RulesLoading,
            LoadState::Error(_) => ViewMarker::RulesLoadError,
            LoadState::Empty => ViewMarker::NoRulesFound,
            LoadState::Loaded(_) => ViewMarker::RuleList,
        }
    }

    /// Start a fetch; pass the returned generation to `finish_load`.
    pub fn begin_load(&mut self) -> u64 {
        self.rules.begin()
    }

    /// Apply a fetch result, sorting rules ascending by value.
    pub fn finish_load(&mut self, generation: u64, result: Result<Vec<Rule>, CoreError>) -> bool {
        let service = &self.rule_service;
        let sorted = result.map(|mut rules| {
            service.sort_by_value(&mut rules);
            rules
        });
        self.rules
            .finish(generation, sorted, |rules| rules.is_empty(), RULES_ERROR_MESSAGE)
    }

    /// Rules in display order; empty unless the list is loaded.
    pub fn entries(&self) -> &[Rule] {
        self.rules.state().loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Description line of every entry, in display order.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries().iter().map(Rule::describe).collect()
    }

    /// Net of one occurrence of every listed rule, shown under the list.
    pub fn net_value(&self) -> f64 {
        self.rule_service.net_value(self.entries())
    }

    pub fn find(&self, rule_id: &RuleId) -> Option<&Rule> {
        self.entries().iter().find(|r| &r.id == rule_id)
    }
}

impl Default for RulesView {
    fn default() -> Self {
        Self::new()
    }
}
