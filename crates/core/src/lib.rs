pub mod api;
pub mod auth;
pub mod clock;
pub mod errors;
pub mod models;
pub mod services;
pub mod views;

use std::sync::Arc;

use api::traits::PlannerApi;
use auth::{plan_access, IdentityProvider, PlanAccess};
use clock::{Clock, SystemClock};
use errors::CoreError;
use models::{
    chart::{ChartTab, Horizon},
    rule::{Rule, RuleId},
    settings::Settings,
    user::UserIdentity,
};
use services::refresh::{
    RefreshCause, RefreshCoordinator, RefreshEvent, RefreshObserver, RefreshPolicy,
};
use views::{
    daybyday_view::DayByDayView,
    rule_form::RuleForm,
    rule_modal::{CloseReason, RuleModal, ESCAPE_KEY},
    rules_view::RulesView,
};

type ValidationHook = Box<dyn Fn(&str) + Send + Sync>;

/// Main entry point for the MoneyWise planner core: the plan page of one
/// signed-in user.
///
/// Owns the rule list, the create form, the edit modal, the projection
/// panel and the refresh coordinator, and is the only thing that talks to
/// the backend. A renderer reads the views and forwards user actions to the
/// methods below.
#[must_use]
pub struct Planner<A: PlannerApi> {
    api: A,
    user: UserIdentity,
    rules: RulesView,
    create_form: RuleForm,
    modal: RuleModal,
    projection: DayByDayView,
    refresh: RefreshCoordinator,
    clock: Box<dyn Clock>,
    on_failed_validation: ValidationHook,
}

impl<A: PlannerApi> std::fmt::Debug for Planner<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("user", &self.user.sub)
            .field("rules", &self.rules.marker())
            .field("modal_open", &self.modal.is_open())
            .field("projection", &self.projection.marker())
            .field("horizon", &self.projection.horizon())
            .field("refresh_generation", &self.refresh.generation())
            .finish()
    }
}

impl<A: PlannerApi> Planner<A> {
    /// Build the plan page for `user`. Nothing is fetched until `mount`.
    pub fn new(api: A, user: UserIdentity, settings: &Settings) -> Self {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let projection = DayByDayView::new(clock.now(), settings.default_horizon);
        Self {
            api,
            user,
            rules: RulesView::new(),
            create_form: RuleForm::new(),
            modal: RuleModal::new(),
            projection,
            refresh: RefreshCoordinator::default(),
            clock,
            on_failed_validation: Box::new(|_| {}),
        }
    }

    /// Build the plan page for whoever the identity provider reports.
    /// Fails with `NotAuthenticated` unless a user is signed in.
    pub fn from_identity<P: IdentityProvider + ?Sized>(
        api: A,
        provider: &P,
        settings: &Settings,
    ) -> Result<Self, CoreError> {
        match plan_access(provider) {
            PlanAccess::Ready(user) => Ok(Self::new(api, user, settings)),
            PlanAccess::Pending | PlanAccess::LoginRequired => Err(CoreError::NotAuthenticated),
        }
    }

    /// Replace the clock; the projection origin moves to the new clock's "now".
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.projection.set_origin(clock.now());
        self.clock = Box::new(clock);
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh.set_policy(policy);
        self
    }

    /// Called with a human-readable message whenever a form fails validation.
    pub fn on_failed_validation(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_failed_validation = Box::new(hook);
        self
    }

    /// Notify `observer` after every refresh (e.g., a sibling panel).
    pub fn subscribe(&mut self, observer: Arc<dyn RefreshObserver>) {
        self.refresh.subscribe(observer);
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// First render: read the rule list and the projection.
    pub async fn mount(&mut self) {
        self.load_rules().await;
        self.load_projection().await;
    }

    /// Re-read the rule list. Failures become the list's error state.
    pub async fn load_rules(&mut self) {
        let generation = self.rules.begin_load();
        let result = self.api.list_rules(&self.user.sub).await;
        self.rules.finish_load(generation, result);
    }

    /// Re-read the projection for the current window.
    pub async fn load_projection(&mut self) {
        let (generation, window) = self.projection.begin_load();
        let result = self.api.get_daybydays(&self.user.sub, &window).await;
        self.projection.finish_load(generation, &window, result);
    }

    /// Invalidate both panels: re-read the rules, move the projection
    /// origin to "now", re-read the projection and notify observers.
    /// Returns `None` when the refresh policy ignores `cause`.
    pub async fn trigger_refresh(&mut self, cause: RefreshCause) -> Option<RefreshEvent> {
        let event = self.refresh.trigger(cause)?;
        self.load_rules().await;
        self.projection.set_origin(self.clock.now());
        self.load_projection().await;
        Some(event)
    }

    // ── Create ──────────────────────────────────────────────────────

    #[must_use]
    pub fn create_form(&self) -> &RuleForm {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut RuleForm {
        &mut self.create_form
    }

    /// Validate the create form and send it. Invalid input never reaches
    /// the backend; a created rule clears the form and refreshes.
    pub async fn submit_create_form(&mut self) -> Result<Rule, CoreError> {
        let mutation = self.check_input(self.create_form.to_mutation())?;

        match self.api.create_rule(&self.user.sub, &mutation).await {
            Ok(created) => {
                tracing::info!(rule_id = %created.id, name = %created.name, "created rule");
                self.create_form.reset();
                self.trigger_refresh(RefreshCause::Created).await;
                Ok(created)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create rule");
                Err(e)
            }
        }
    }

    // ── Edit modal ──────────────────────────────────────────────────

    #[must_use]
    pub fn modal(&self) -> &RuleModal {
        &self.modal
    }

    pub fn modal_form_mut(&mut self) -> Option<&mut RuleForm> {
        self.modal.form_mut()
    }

    /// Open the modal for a rule of the current list.
    pub async fn open_rule(&mut self, rule_id: &RuleId) -> Result<(), CoreError> {
        let rule = self
            .rules
            .find(rule_id)
            .cloned()
            .ok_or_else(|| CoreError::RuleNotFound(rule_id.to_string()))?;
        self.modal.open(rule);
        self.trigger_refresh(RefreshCause::ModalOpened).await;
        Ok(())
    }

    /// Rebind the open modal to the rule as the backend has it now.
    /// If the rule is gone the modal closes.
    pub async fn reload_open_rule(&mut self) -> Result<(), CoreError> {
        let Some(rule_id) = self.modal.rule_id().cloned() else {
            return Ok(());
        };
        match self.api.get_rule(&self.user.sub, &rule_id).await {
            Ok(rule) => {
                self.modal.open(rule);
                Ok(())
            }
            Err(CoreError::RuleNotFound(id)) => {
                tracing::warn!(rule_id = %id, "open rule no longer exists");
                self.close_modal(CloseReason::Cancelled).await;
                Err(CoreError::RuleNotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Close the modal for any reason. Returns `false` if it was not open.
    pub async fn close_modal(&mut self, reason: CloseReason) -> bool {
        if self.modal.close(reason).is_none() {
            return false;
        }
        self.trigger_refresh(RefreshCause::ModalClosed).await;
        true
    }

    /// Keyboard handling while the plan page has focus: Escape closes the modal.
    pub async fn key_down(&mut self, key_code: u32) -> bool {
        key_code == ESCAPE_KEY && self.close_modal(CloseReason::Escape).await
    }

    /// Send the edit form as a full replacement of the open rule.
    /// On failure the modal stays open with its input intact.
    pub async fn submit_update(&mut self) -> Result<Rule, CoreError> {
        let (rule_id, form_result) = match (self.modal.rule_id(), self.modal.form()) {
            (Some(id), Some(form)) => (id.clone(), form.to_mutation()),
            _ => return Err(CoreError::Validation("No rule is open for editing".into())),
        };
        let mutation = self.check_input(form_result)?;

        match self.api.update_rule(&self.user.sub, &rule_id, &mutation).await {
            Ok(updated) => {
                tracing::info!(rule_id = %rule_id, name = %updated.name, "updated rule");
                self.close_modal(CloseReason::Submitted).await;
                self.trigger_refresh(RefreshCause::Updated).await;
                Ok(updated)
            }
            Err(e) => {
                tracing::error!(rule_id = %rule_id, error = %e, "failed to update rule");
                Err(e)
            }
        }
    }

    /// Delete the open rule. On failure the modal stays open.
    pub async fn delete_open_rule(&mut self) -> Result<(), CoreError> {
        let Some(rule_id) = self.modal.rule_id().cloned() else {
            return Err(CoreError::Validation("No rule is open for editing".into()));
        };

        match self.api.delete_rule(&self.user.sub, &rule_id).await {
            Ok(()) => {
                tracing::info!(rule_id = %rule_id, "deleted rule");
                self.trigger_refresh(RefreshCause::Deleted).await;
                self.close_modal(CloseReason::Deleted).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(rule_id = %rule_id, error = %e, "failed to delete rule");
                Err(e)
            }
        }
    }

    // ── Projection ──────────────────────────────────────────────────

    #[must_use]
    pub fn projection(&self) -> &DayByDayView {
        &self.projection
    }

    /// Change the horizon and re-read the projection for the new window.
    pub async fn select_horizon(&mut self, horizon: Horizon) {
        self.projection.select_horizon(horizon);
        self.load_projection().await;
    }

    pub fn select_chart_tab(&mut self, tab: ChartTab) {
        self.projection.select_tab(tab);
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    #[must_use]
    pub fn rules(&self) -> &RulesView {
        &self.rules
    }

    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh.policy()
    }

    /// Number of refreshes delivered so far.
    #[must_use]
    pub fn refresh_generation(&self) -> u64 {
        self.refresh.generation()
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Report invalid form input through the validation hook.
    fn check_input<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        result.map_err(|e| {
            let message = match &e {
                CoreError::Validation(m) | CoreError::InvalidRecurrence(m) => m.clone(),
                other => other.to_string(),
            };
            tracing::warn!(%message, "bad input");
            (self.on_failed_validation)(&message);
            e
        })
    }
}
