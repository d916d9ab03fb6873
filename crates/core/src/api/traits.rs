use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::daybyday::{DayByDay, ProjectionWindow};
use crate::models::rule::{Rule, RuleId, RuleMutation};

/// The MoneyWise backend, as seen by the planner.
///
/// `HttpPlannerApi` talks to the real REST service; tests and offline hosts
/// plug in their own implementation. Every call is scoped to one user.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PlannerApi: Send + Sync {
    /// All rules owned by `user_id`, in backend order.
    async fn list_rules(&self, user_id: &str) -> Result<Vec<Rule>, CoreError>;

    /// A single rule. Unknown ids yield `CoreError::RuleNotFound`.
    async fn get_rule(&self, user_id: &str, rule_id: &RuleId) -> Result<Rule, CoreError>;

    /// Create a rule and return it as stored (with its new id).
    async fn create_rule(&self, user_id: &str, rule: &RuleMutation) -> Result<Rule, CoreError>;

    /// Replace every attribute of an existing rule.
    async fn update_rule(
        &self,
        user_id: &str,
        rule_id: &RuleId,
        rule: &RuleMutation,
    ) -> Result<Rule, CoreError>;

    async fn delete_rule(&self, user_id: &str, rule_id: &RuleId) -> Result<(), CoreError>;

    /// The forecast for `window`. Points are returned as the backend sent them;
    /// ordering is checked by `ProjectionSeries`.
    async fn get_daybydays(
        &self,
        user_id: &str,
        window: &ProjectionWindow,
    ) -> Result<Vec<DayByDay>, CoreError>;
}
