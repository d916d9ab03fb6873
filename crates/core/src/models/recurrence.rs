use chrono::{NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// How often a rule repeats (the `FREQ` part of an RRULE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

impl Frequency {
    /// Every frequency, in the order a selector lists them.
    pub const ALL: [Frequency; 7] = [
        Frequency::Yearly,
        Frequency::Monthly,
        Frequency::Weekly,
        Frequency::Daily,
        Frequency::Hourly,
        Frequency::Minutely,
        Frequency::Secondly,
    ];

    pub fn as_rrule(&self) -> &'static str {
        match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
            Frequency::Hourly => "HOURLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Secondly => "SECONDLY",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Frequency::Yearly => "year",
            Frequency::Monthly => "month",
            Frequency::Weekly => "week",
            Frequency::Daily => "day",
            Frequency::Hourly => "hour",
            Frequency::Minutely => "minute",
            Frequency::Secondly => "second",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_rrule())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_rrule() == upper)
            .ok_or_else(|| CoreError::InvalidRecurrence(format!("unknown frequency {s:?}")))
    }
}

/// A repeating calendar pattern, convertible to and from RFC 5545 RRULE text.
///
/// The parts the rule forms can produce are modelled as fields: frequency,
/// interval, count, until, start date and the `BYMONTH`, `BYMONTHDAY` and
/// plain `BYDAY` filters. Any other part (`WKST`, `BYSETPOS`, ordinal
/// `BYDAY`, ...) is kept verbatim in `extra_parts` and written back as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub frequency: Frequency,

    /// Repeat every `interval` units of `frequency` (always >= 1)
    pub interval: u32,

    /// Stop after this many occurrences
    pub count: Option<u32>,

    /// Stop after this date (inclusive)
    pub until: Option<NaiveDate>,

    /// First occurrence (`DTSTART`); the backend picks one when absent
    pub start: Option<NaiveDate>,

    /// Days of the month; negative values count back from the month end
    pub by_month_day: Vec<i8>,

    pub by_weekday: Vec<Weekday>,

    /// Months of the year, 1 = January
    pub by_month: Vec<u32>,

    /// Parts without a field of their own, as `(KEY, value)` in input order
    pub extra_parts: Vec<(String, String)>,

    /// The original `DTSTART` line when it carries a time or a time zone
    pub start_line: Option<String>,
}

impl Recurrence {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
            start: None,
            by_month_day: Vec::new(),
            by_weekday: Vec::new(),
            by_month: Vec::new(),
            extra_parts: Vec::new(),
            start_line: None,
        }
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self.start_line = None;
        self
    }

    pub fn on_month_day(mut self, day: i8) -> Self {
        if !self.by_month_day.contains(&day) {
            self.by_month_day.push(day);
        }
        self
    }

    pub fn on_weekday(mut self, weekday: Weekday) -> Self {
        if !self.by_weekday.contains(&weekday) {
            self.by_weekday.push(weekday);
        }
        self
    }

    pub fn in_month(mut self, month: u32) -> Self {
        if !self.by_month.contains(&month) {
            self.by_month.push(month);
        }
        self
    }

    /// Check the schedule is one the backend will accept.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.check().map_err(|msg| CoreError::Validation(msg.to_string()))
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.interval < 1 {
            return Err("Interval must be at least 1");
        }
        if self.count == Some(0) {
            return Err("Count must be at least 1");
        }
        if self.count.is_some() && self.until.is_some() {
            return Err("Count and end date cannot both be set");
        }
        if self
            .by_month_day
            .iter()
            .any(|d| *d == 0 || !(-31..=31).contains(d))
        {
            return Err("Day of month must be between 1 and 31");
        }
        if self.by_month.iter().any(|m| !(1..=12).contains(m)) {
            return Err("Month must be between 1 and 12");
        }
        if let (Some(start), Some(until)) = (self.start, self.until) {
            if until < start {
                return Err("End date must not be before start date");
            }
        }
        Ok(())
    }

    /// Human-readable description, e.g. `every 2 weeks on Monday and Friday for 10 times`.
    pub fn describe(&self) -> String {
        let unit = self.frequency.unit();
        let mut text = if self.interval == 1 {
            format!("every {unit}")
        } else {
            format!("every {} {unit}s", self.interval)
        };

        if !self.by_month.is_empty() {
            let months: Vec<String> = self
                .by_month
                .iter()
                .map(|m| month_name(*m).to_string())
                .collect();
            text.push_str(&format!(" in {}", join_words(&months)));
        }
        if !self.by_weekday.is_empty() {
            let days: Vec<String> = self
                .by_weekday
                .iter()
                .map(|d| weekday_name(*d).to_string())
                .collect();
            text.push_str(&format!(" on {}", join_words(&days)));
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(|d| month_day_words(*d)).collect();
            text.push_str(&format!(" on the {}", join_words(&days)));
        }
        if let Some(start) = self.start {
            text.push_str(&format!(" starting {start}"));
        }
        match self.count {
            Some(1) => text.push_str(" for 1 time"),
            Some(n) => text.push_str(&format!(" for {n} times")),
            None => {}
        }
        if let Some(until) = self.until {
            text.push_str(&format!(" until {until}"));
        }
        if !self.extra_parts.is_empty() {
            let parts: Vec<String> = self
                .extra_parts
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            text.push_str(&format!(" ({})", parts.join(";")));
        }
        text
    }
}

impl fmt::Display for Recurrence {
    /// Serialise as RRULE text. A start date produces the two-line
    /// `DTSTART:...\nRRULE:...` form; otherwise only the rule parts are written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.start_line, self.start) {
            (Some(line), _) => write!(f, "{line}\nRRULE:")?,
            (None, Some(start)) => write!(f, "DTSTART:{}\nRRULE:", format_rrule_date(start))?,
            (None, None) => {}
        }
        write!(f, "FREQ={}", self.frequency.as_rrule())?;
        if self.interval > 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", format_rrule_date(until))?;
        }
        if !self.by_month.is_empty() {
            write!(f, ";BYMONTH={}", join_list(&self.by_month))?;
        }
        if !self.by_month_day.is_empty() {
            write!(f, ";BYMONTHDAY={}", join_list(&self.by_month_day))?;
        }
        if !self.by_weekday.is_empty() {
            let codes: Vec<&str> = self.by_weekday.iter().map(|d| weekday_code(*d)).collect();
            write!(f, ";BYDAY={}", codes.join(","))?;
        }
        for (key, value) in &self.extra_parts {
            write!(f, ";{key}={value}")?;
        }
        Ok(())
    }
}

impl FromStr for Recurrence {
    type Err = CoreError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut start = None;
        let mut start_line = None;
        let mut body: Option<&str> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if starts_with_ci(line, "DTSTART") {
                // DTSTART:20210101T000000Z or DTSTART;TZID=...:20210101T000000
                let (_, value) = line
                    .rsplit_once(':')
                    .ok_or_else(|| invalid(format!("malformed start line {line:?}")))?;
                let date = parse_rrule_date(value)?;
                if line != format!("DTSTART:{}", format_rrule_date(date)) {
                    start_line = Some(line.to_string());
                }
                start = Some(date);
            } else if body.is_none() {
                body = Some(if starts_with_ci(line, "RRULE:") {
                    &line["RRULE:".len()..]
                } else {
                    line
                });
            } else {
                return Err(invalid(format!("unexpected line {line:?}")));
            }
        }

        let body = body.ok_or_else(|| invalid("missing FREQ".to_string()))?;
        let mut frequency = None;
        let mut rule = Recurrence::new(Frequency::Daily);

        for part in body.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(format!("malformed part {part:?}")))?;
            let key = key.trim().to_ascii_uppercase();
            match key.as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>()?),
                "INTERVAL" => rule.interval = parse_number(&key, value)?,
                "COUNT" => rule.count = Some(parse_number(&key, value)?),
                "UNTIL" => rule.until = Some(parse_rrule_date(value)?),
                "BYMONTH" => rule.by_month = parse_list(&key, value)?,
                "BYMONTHDAY" => rule.by_month_day = parse_list(&key, value)?,
                // Ordinal days (1MO, -1FR) have no field; keep them as text
                "BYDAY" if value.split(',').any(|code| code.trim().len() > 2) => {
                    check_ordinal_days(value)?;
                    rule.extra_parts.push((key.clone(), value.trim().to_string()))
                }
                "BYDAY" => {
                    rule.by_weekday = value
                        .split(',')
                        .map(parse_weekday)
                        .collect::<Result<_, _>>()?
                }
                _ if is_part_name(&key) && !value.trim().is_empty() => {
                    rule.extra_parts.push((key.clone(), value.trim().to_string()))
                }
                _ => return Err(invalid(format!("malformed part {part:?}"))),
            }
        }

        rule.frequency = frequency.ok_or_else(|| invalid("missing FREQ".to_string()))?;
        rule.start = start;
        rule.start_line = start_line;
        rule.check().map_err(|msg| invalid(msg.to_string()))?;
        Ok(rule)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn invalid(message: String) -> CoreError {
    CoreError::InvalidRecurrence(message)
}

fn starts_with_ci(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// RFC 5545 part names are letters and dashes (`WKST`, `BYSETPOS`, `X-NAME`).
fn is_part_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{key} expects a number, got {value:?}")))
}

fn parse_list<T: FromStr>(key: &str, value: &str) -> Result<Vec<T>, CoreError> {
    value.split(',').map(|v| parse_number(key, v)).collect()
}

fn format_rrule_date(date: NaiveDate) -> String {
    date.format("%Y%m%dT000000Z").to_string()
}

/// Accepts `20210115`, `20210115T000000` and `20210115T000000Z`; the time is dropped.
fn parse_rrule_date(value: &str) -> Result<NaiveDate, CoreError> {
    value
        .trim()
        .get(..8)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
        .ok_or_else(|| invalid(format!("invalid date {value:?}")))
}

fn parse_weekday(code: &str) -> Result<Weekday, CoreError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(invalid(format!("unsupported weekday {other:?}"))),
    }
}

/// `BYDAY` entries with an optional signed week number: `MO`, `1MO`, `-1FR`.
fn check_ordinal_days(value: &str) -> Result<(), CoreError> {
    for code in value.split(',').map(str::trim) {
        let split = code.len().saturating_sub(2);
        let (week, day) = code
            .get(..split)
            .zip(code.get(split..))
            .ok_or_else(|| invalid(format!("unsupported weekday {code:?}")))?;
        parse_weekday(day)?;
        let week_ok = week.is_empty()
            || matches!(week.parse::<i8>(), Ok(n) if n != 0 && n.unsigned_abs() <= 53);
        if !week_ok {
            return Err(invalid(format!("unsupported weekday {code:?}")));
        }
    }
    Ok(())
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August",
        "September", "October", "November", "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn month_day_words(day: i8) -> String {
    match day {
        -1 => "last day".to_string(),
        d if d < 0 => format!("{} to last day", ordinal(u32::from(d.unsigned_abs()))),
        d => ordinal(u32::from(d.unsigned_abs())),
    }
}

fn join_words(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn join_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
