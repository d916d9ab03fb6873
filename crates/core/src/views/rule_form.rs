use chrono::{NaiveDate, Weekday};

use crate::errors::CoreError;
use crate::models::recurrence::{Frequency, Recurrence};
use crate::models::rule::{Rule, RuleMutation};
use crate::services::rule_service::RuleService;

/// The recurrence selector: a frequency plus the fields that apply to it.
///
/// Fields that do not apply to the selected frequency are kept (so switching
/// back and forth does not lose input) but ignored when building the rule:
/// `day_of_month` is used for monthly and yearly, `weekdays` for weekly and
/// `month` for yearly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceForm {
    pub frequency: Frequency,
    pub interval: u32,
    pub day_of_month: Option<i8>,
    pub weekdays: Vec<Weekday>,
    pub month: Option<u32>,
    pub count: Option<u32>,
    pub until: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
}

impl Default for RecurrenceForm {
    fn default() -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval: 1,
            day_of_month: None,
            weekdays: Vec::new(),
            month: None,
            count: None,
            until: None,
            start: None,
        }
    }
}

impl RecurrenceForm {
    /// Prefill from a parsed schedule. `None` unless the selector writes back
    /// exactly the same schedule (so nothing it cannot show gets dropped).
    pub fn from_recurrence(rule: &Recurrence) -> Option<Self> {
        if rule.by_month_day.len() > 1 || rule.by_month.len() > 1 {
            return None;
        }
        let form = Self {
            frequency: rule.frequency,
            interval: rule.interval,
            day_of_month: rule.by_month_day.first().copied(),
            weekdays: rule.by_weekday.clone(),
            month: rule.by_month.first().copied(),
            count: rule.count,
            until: rule.until,
            start: rule.start,
        };
        match form.to_recurrence() {
            Ok(rebuilt) if rebuilt == *rule => Some(form),
            _ => None,
        }
    }

    /// Build and validate the schedule.
    pub fn to_recurrence(&self) -> Result<Recurrence, CoreError> {
        let mut rule = Recurrence::new(self.frequency).every(self.interval);
        rule.count = self.count;
        rule.until = self.until;
        rule.start = self.start;

        match self.frequency {
            Frequency::Weekly => {
                if self.weekdays.is_empty() {
                    return Err(CoreError::Validation("Choose at least one weekday".into()));
                }
                for day in &self.weekdays {
                    rule = rule.on_weekday(*day);
                }
            }
            Frequency::Monthly => {
                if let Some(day) = self.day_of_month {
                    rule = rule.on_month_day(day);
                }
            }
            Frequency::Yearly => {
                if let Some(month) = self.month {
                    rule = rule.in_month(month);
                }
                if let Some(day) = self.day_of_month {
                    rule = rule.on_month_day(day);
                }
            }
            _ => {}
        }

        rule.validate()?;
        Ok(rule)
    }
}

/// Returned by the schedule setters while the recurrence is text-only.
pub const SCHEDULE_TEXT_ONLY_MESSAGE: &str = "This schedule can only be edited as text";

/// Input state shared by the create form and the edit modal.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleForm {
    name: String,
    value: String,
    recurrence: RecurrenceForm,
    /// Recurrence text to send unchanged, until the user edits the schedule
    verbatim_rrule: Option<String>,
    /// False when the selector cannot represent the recurrence text
    schedule_editable: bool,
}

impl Default for RuleForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            recurrence: RecurrenceForm::default(),
            verbatim_rrule: None,
            schedule_editable: true,
        }
    }
}

impl RuleForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from an existing rule. The stored recurrence text is sent back
    /// untouched unless a recurrence field is edited. If the selector cannot
    /// show the stored schedule exactly, the schedule stays text-only.
    pub fn from_rule(rule: &Rule) -> Self {
        let recurrence = rule
            .recurrence()
            .and_then(|r| RecurrenceForm::from_recurrence(&r));
        if recurrence.is_none() {
            tracing::debug!(rule_id = %rule.id, "schedule is not editable in the selector");
        }
        Self {
            name: rule.name.clone(),
            value: rule.value.to_string(),
            schedule_editable: recurrence.is_some(),
            recurrence: recurrence.unwrap_or_default(),
            verbatim_rrule: Some(rule.rrule.clone()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ── Inputs ──────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The value as typed; parsed on submit.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    // Schedule setters fail with `SCHEDULE_TEXT_ONLY_MESSAGE` while the
    // recurrence is text-only; the form is left unchanged.

    pub fn select_frequency(&mut self, frequency: Frequency) -> Result<(), CoreError> {
        self.schedule_mut()?.frequency = frequency;
        Ok(())
    }

    pub fn set_interval(&mut self, interval: u32) -> Result<(), CoreError> {
        self.schedule_mut()?.interval = interval;
        Ok(())
    }

    pub fn set_day_of_month(&mut self, day: i8) -> Result<(), CoreError> {
        self.schedule_mut()?.day_of_month = Some(day);
        Ok(())
    }

    /// Add the weekday if missing, remove it if present.
    pub fn toggle_weekday(&mut self, day: Weekday) -> Result<(), CoreError> {
        let days = &mut self.schedule_mut()?.weekdays;
        match days.iter().position(|d| *d == day) {
            Some(idx) => {
                days.remove(idx);
            }
            None => days.push(day),
        }
        Ok(())
    }

    pub fn set_month(&mut self, month: u32) -> Result<(), CoreError> {
        self.schedule_mut()?.month = Some(month);
        Ok(())
    }

    pub fn set_count(&mut self, count: Option<u32>) -> Result<(), CoreError> {
        self.schedule_mut()?.count = count;
        Ok(())
    }

    pub fn set_until(&mut self, until: Option<NaiveDate>) -> Result<(), CoreError> {
        self.schedule_mut()?.until = until;
        Ok(())
    }

    pub fn set_start(&mut self, start: Option<NaiveDate>) -> Result<(), CoreError> {
        self.schedule_mut()?.start = start;
        Ok(())
    }

    /// Type the recurrence text directly instead of using the selector.
    /// The selector follows the text when it can show it exactly.
    pub fn set_rrule_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match text
            .parse::<Recurrence>()
            .ok()
            .and_then(|r| RecurrenceForm::from_recurrence(&r))
        {
            Some(form) => {
                self.recurrence = form;
                self.schedule_editable = true;
            }
            None => self.schedule_editable = false,
        }
        self.verbatim_rrule = Some(text);
    }

    /// Discard the recurrence text and go back to the selector.
    pub fn clear_rrule_text(&mut self) {
        self.verbatim_rrule = None;
        self.schedule_editable = true;
    }

    fn schedule_mut(&mut self) -> Result<&mut RecurrenceForm, CoreError> {
        if !self.schedule_editable {
            return Err(CoreError::Validation(SCHEDULE_TEXT_ONLY_MESSAGE.into()));
        }
        self.verbatim_rrule = None;
        Ok(&mut self.recurrence)
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_text(&self) -> &str {
        &self.value
    }

    pub fn recurrence(&self) -> &RecurrenceForm {
        &self.recurrence
    }

    /// True while the recurrence text will be sent as-is.
    pub fn is_recurrence_verbatim(&self) -> bool {
        self.verbatim_rrule.is_some()
    }

    /// False when the selector cannot show the recurrence text exactly; only
    /// `set_rrule_text` or `clear_rrule_text` change the schedule then.
    pub fn is_schedule_editable(&self) -> bool {
        self.schedule_editable
    }

    /// Description of the schedule as currently entered, if it is valid.
    pub fn schedule_preview(&self) -> Option<String> {
        match &self.verbatim_rrule {
            Some(text) => Some(
                text.parse::<Recurrence>()
                    .map(|r| r.describe())
                    .unwrap_or_else(|_| text.clone()),
            ),
            None => self.recurrence.to_recurrence().ok().map(|r| r.describe()),
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate every field and build the request payload.
    /// The first failing field determines the message.
    pub fn to_mutation(&self) -> Result<RuleMutation, CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Name is required".into()));
        }
        let value = parse_value(&self.value)?;
        let rrule = match &self.verbatim_rrule {
            Some(text) => text.clone(),
            None => self.recurrence.to_recurrence()?.to_string(),
        };

        let mutation = RuleMutation {
            name: name.to_string(),
            value,
            rrule,
        };
        RuleService::new().validate_mutation(&mutation)?;
        Ok(mutation)
    }
}

/// Parse a typed amount; thousands separators and surrounding spaces are allowed.
fn parse_value(text: &str) -> Result<f64, CoreError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::Validation("Value must be a number".into()))
}
