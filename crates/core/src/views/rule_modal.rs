use super::rule_form::RuleForm;
use crate::models::rule::{Rule, RuleId};

/// Key code of the Escape key.
pub const ESCAPE_KEY: u32 = 27;

/// Why the modal closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    Submitted,
    Deleted,
    Cancelled,
    Escape,
    ClickOutside,
}

/// The rule currently open for editing, with its edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRule {
    pub rule: Rule,
    pub form: RuleForm,
}

/// The single edit/delete modal.
///
/// `Closed` → `open(rule)` → `Open` → `close(reason)` → `Closed`. Opening
/// while already open rebinds the one modal to the new rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleModal {
    open: Option<OpenRule>,
}

impl RuleModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the modal to `rule`, with a form prefilled from its current data.
    pub fn open(&mut self, rule: Rule) {
        let form = RuleForm::from_rule(&rule);
        self.open = Some(OpenRule { rule, form });
    }

    /// Close the modal. Returns the rule that was open, if any.
    pub fn close(&mut self, reason: CloseReason) -> Option<Rule> {
        let closed = self.open.take().map(|open| open.rule);
        if let Some(rule) = &closed {
            tracing::debug!(rule_id = %rule.id, ?reason, "modal closed");
        }
        closed
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The page scroll is locked exactly while the modal is open.
    pub fn scroll_locked(&self) -> bool {
        self.is_open()
    }

    pub fn rule(&self) -> Option<&Rule> {
        self.open.as_ref().map(|o| &o.rule)
    }

    pub fn rule_id(&self) -> Option<&RuleId> {
        self.rule().map(|r| &r.id)
    }

    pub fn form(&self) -> Option<&RuleForm> {
        self.open.as_ref().map(|o| &o.form)
    }

    pub fn form_mut(&mut self) -> Option<&mut RuleForm> {
        self.open.as_mut().map(|o| &mut o.form)
    }
}
