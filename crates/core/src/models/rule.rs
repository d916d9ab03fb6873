use serde::{Deserialize, Serialize};

use super::de;
use super::recurrence::Recurrence;

/// Opaque identifier of a rule, assigned by the backend.
///
/// The backend may hand out numeric ids; they are kept as text on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        de::id_string(deserializer).map(Self)
    }
}

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A recurring income or expense, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Backend-assigned identifier
    pub id: RuleId,

    /// Owner (the identity provider's `sub`)
    #[serde(default)]
    pub userid: String,

    /// Display name (e.g., "Rent", "Paycheck")
    pub name: String,

    /// Signed amount: negative = expense, positive = income
    #[serde(deserialize_with = "de::number_or_string")]
    pub value: f64,

    /// RFC 5545 recurrence text, sent to the backend as-is
    #[serde(alias = "recurrence")]
    pub rrule: String,
}

impl Rule {
    pub fn is_expense(&self) -> bool {
        self.value < 0.0
    }

    /// The parsed schedule, if the stored text is something we understand.
    pub fn recurrence(&self) -> Option<Recurrence> {
        self.rrule.parse().ok()
    }

    /// One-line description for list entries, e.g. `Rent -1,000.00 every month on the 1st`.
    /// Falls back to the raw recurrence text when it cannot be parsed.
    pub fn describe(&self) -> String {
        let schedule = self
            .recurrence()
            .map(|r| r.describe())
            .unwrap_or_else(|| self.rrule.clone());
        format!("{} {} {}", self.name, format_value(self.value), schedule)
    }

    /// The full-replacement payload that reproduces this rule.
    pub fn to_mutation(&self) -> RuleMutation {
        RuleMutation {
            name: self.name.clone(),
            value: self.value,
            rrule: self.rrule.clone(),
        }
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMutation {
    pub name: String,
    pub value: f64,
    #[serde(alias = "recurrence")]
    pub rrule: String,
}

/// `{ "data": [...] }` envelope of the rule listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RuleListResponse {
    #[serde(default)]
    pub data: Option<Vec<Rule>>,
}

impl RuleListResponse {
    pub fn into_rules(self) -> Vec<Rule> {
        self.data.unwrap_or_default()
    }
}

/// Format a signed amount with two decimals and thousands separators,
/// always showing the sign: `-1,000.10`, `+2,500.00`.
pub fn format_value(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{cents}")
}
