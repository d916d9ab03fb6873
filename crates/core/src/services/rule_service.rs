use crate::errors::CoreError;
use crate::models::rule::{Rule, RuleMutation};

/// Ordering and validation of rules.
///
/// Pure business logic: no I/O, no API calls.
pub struct RuleService;

impl RuleService {
    pub fn new() -> Self {
        Self
    }

    /// Sort ascending by value: biggest expenses first, biggest incomes last.
    /// The sort is stable, so rules of equal value keep the backend's order.
    pub fn sort_by_value(&self, rules: &mut [Rule]) {
        rules.sort_by(|a, b| a.value.total_cmp(&b.value));
    }

    /// Check a payload before it is sent to the backend.
    pub fn validate_mutation(&self, rule: &RuleMutation) -> Result<(), CoreError> {
        if rule.name.trim().is_empty() {
            return Err(CoreError::Validation("Name is required".into()));
        }
        if !rule.value.is_finite() {
            return Err(CoreError::Validation("Value must be a number".into()));
        }
        if rule.rrule.trim().is_empty() {
            return Err(CoreError::Validation("Recurrence is required".into()));
        }
        Ok(())
    }

    /// Net value of all rules, treating each as one occurrence.
    pub fn net_value(&self, rules: &[Rule]) -> f64 {
        rules.iter().map(|r| r.value).sum()
    }
}

impl Default for RuleService {
    fn default() -> Self {
        Self::new()
    }
}
