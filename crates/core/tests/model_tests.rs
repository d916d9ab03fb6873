// ═══════════════════════════════════════════════════════════════════
// Model Tests — Rule, Recurrence, DayByDay, Horizon, Settings, User
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde_json::json;

use moneywise_core::errors::CoreError;
use moneywise_core::models::chart::{ChartKind, ChartTab, Horizon};
use moneywise_core::models::daybyday::{
    Candle, DayByDay, DayByDayResponse, ProjectionSeries, ProjectionWindow,
};
use moneywise_core::models::recurrence::{Frequency, Recurrence};
use moneywise_core::models::rule::{format_value, Rule, RuleId, RuleListResponse, RuleMutation};
use moneywise_core::models::settings::Settings;
use moneywise_core::models::user::UserIdentity;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

fn rule(id: &str, name: &str, value: f64, rrule: &str) -> Rule {
    Rule {
        id: RuleId::new(id),
        userid: "test".into(),
        name: name.into(),
        value,
        rrule: rrule.into(),
    }
}

fn point(date: NaiveDate, balance: f64) -> DayByDay {
    DayByDay {
        date,
        balance: Candle::flat(balance),
        working_capital: Candle::flat(balance / 2.0),
        high_prediction: Candle::flat(balance + 100.0),
        low_prediction: Candle::flat(balance - 100.0),
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Rule
// ═══════════════════════════════════════════════════════════════════

mod rule_model {
    use super::*;

    #[test]
    fn deserializes_backend_rule() {
        let parsed: Rule = serde_json::from_value(json!({
            "id": "test-id-rent",
            "userid": "test",
            "name": "Rent",
            "value": -1000,
            "rrule": "FREQ=MONTHLY;BYMONTHDAY=1"
        }))
        .unwrap();
        assert_eq!(parsed, rule("test-id-rent", "Rent", -1000.0, "FREQ=MONTHLY;BYMONTHDAY=1"));
    }

    #[test]
    fn accepts_numeric_ids_and_decimal_strings() {
        let parsed: Rule = serde_json::from_value(json!({
            "id": 7,
            "userid": "test",
            "name": "Rent",
            "value": "-1000.10",
            "rrule": "FREQ=MONTHLY"
        }))
        .unwrap();
        assert_eq!(parsed.id.as_str(), "7");
        assert_eq!(parsed.value, -1000.10);
    }

    #[test]
    fn accepts_recurrence_alias_and_missing_userid() {
        let parsed: Rule = serde_json::from_value(json!({
            "id": "a",
            "name": "Coffee",
            "value": 5,
            "recurrence": "FREQ=DAILY"
        }))
        .unwrap();
        assert_eq!(parsed.rrule, "FREQ=DAILY");
        assert_eq!(parsed.userid, "");
    }

    #[test]
    fn rejects_non_numeric_value() {
        let result: Result<Rule, _> = serde_json::from_value(json!({
            "id": "a", "name": "x", "value": "lots", "rrule": "FREQ=DAILY"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_finite_value() {
        for value in ["NaN", "inf", "-inf"] {
            let result: Result<Rule, _> = serde_json::from_value(json!({
                "id": "a", "name": "x", "value": value, "rrule": "FREQ=DAILY"
            }));
            assert!(result.is_err(), "{value} was accepted");
        }
    }

    #[test]
    fn mutation_serializes_wire_field_names() {
        let body = RuleMutation {
            name: "Rent".into(),
            value: -1000.1,
            rrule: "FREQ=MONTHLY".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"name": "Rent", "value": -1000.1, "rrule": "FREQ=MONTHLY"})
        );
    }

    #[test]
    fn to_mutation_copies_all_attributes() {
        let r = rule("x", "Rent", -1000.0, "FREQ=DAILY;INTERVAL=2;COUNT=4");
        let m = r.to_mutation();
        assert_eq!(m.name, "Rent");
        assert_eq!(m.value, -1000.0);
        assert_eq!(m.rrule, "FREQ=DAILY;INTERVAL=2;COUNT=4");
    }

    #[test]
    fn list_envelope_tolerates_missing_data() {
        let empty: RuleListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.into_rules().is_empty());
        let null: RuleListResponse = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(null.into_rules().is_empty());
    }

    #[test]
    fn list_envelope_keeps_backend_order() {
        let list: RuleListResponse = serde_json::from_value(json!({"data": [
            {"id": "1", "name": "Salary", "value": 3000, "rrule": "FREQ=MONTHLY"},
            {"id": "2", "name": "Rent", "value": -1000, "rrule": "FREQ=MONTHLY"}
        ]}))
        .unwrap();
        let names: Vec<String> = list.into_rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Salary", "Rent"]);
    }

    #[test]
    fn describe_uses_parsed_schedule() {
        let r = rule("x", "Rent", -1000.0, "FREQ=MONTHLY;BYMONTHDAY=1");
        assert_eq!(r.describe(), "Rent -1,000.00 every month on the 1st");
    }

    #[test]
    fn describe_falls_back_to_raw_text() {
        let r = rule("x", "Rent", -1000.0, "adsf");
        assert_eq!(r.describe(), "Rent -1,000.00 adsf");
    }

    #[test]
    fn expense_sign() {
        assert!(rule("x", "Rent", -1.0, "FREQ=DAILY").is_expense());
        assert!(!rule("x", "Salary", 1.0, "FREQ=DAILY").is_expense());
    }

    #[test]
    fn format_value_is_signed() {
        assert_eq!(format_value(-500.0), "-500.00");
        assert_eq!(format_value(3000.0), "+3,000.00");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Recurrence
// ═══════════════════════════════════════════════════════════════════

mod recurrence {
    use super::*;

    #[test]
    fn monthly_on_a_day() {
        let r = Recurrence::new(Frequency::Monthly).on_month_day(15);
        assert_eq!(r.to_string(), "FREQ=MONTHLY;BYMONTHDAY=15");
        assert_eq!(r.describe(), "every month on the 15th");
    }

    #[test]
    fn weekly_with_interval_and_count() {
        let r = Recurrence::new(Frequency::Weekly)
            .every(2)
            .on_weekday(Weekday::Mon)
            .on_weekday(Weekday::Fri)
            .count(10);
        assert_eq!(r.to_string(), "FREQ=WEEKLY;INTERVAL=2;COUNT=10;BYDAY=MO,FR");
        assert_eq!(r.describe(), "every 2 weeks on Monday and Friday for 10 times");
    }

    #[test]
    fn yearly_in_a_month() {
        let r = Recurrence::new(Frequency::Yearly).in_month(12).on_month_day(25);
        assert_eq!(r.to_string(), "FREQ=YEARLY;BYMONTH=12;BYMONTHDAY=25");
        assert_eq!(r.describe(), "every year in December on the 25th");
    }

    #[test]
    fn start_date_writes_dtstart_line() {
        let r = Recurrence::new(Frequency::Daily).starting(d(2021, 1, 15));
        assert_eq!(r.to_string(), "DTSTART:20210115T000000Z\nRRULE:FREQ=DAILY");
    }

    #[test]
    fn until_and_start_in_description() {
        let r = Recurrence::new(Frequency::Daily)
            .starting(d(2021, 1, 15))
            .until(d(2021, 12, 31));
        assert_eq!(r.describe(), "every day starting 2021-01-15 until 2021-12-31");
        assert!(r.to_string().ends_with("FREQ=DAILY;UNTIL=20211231T000000Z"));
    }

    #[test]
    fn last_day_of_month() {
        let r = Recurrence::new(Frequency::Monthly).on_month_day(-1);
        assert_eq!(r.to_string(), "FREQ=MONTHLY;BYMONTHDAY=-1");
        assert_eq!(r.describe(), "every month on the last day");
    }

    #[test]
    fn single_occurrence_wording() {
        let r = Recurrence::new(Frequency::Daily).count(1);
        assert_eq!(r.describe(), "every day for 1 time");
    }

    #[test]
    fn builder_ignores_duplicates() {
        let r = Recurrence::new(Frequency::Weekly)
            .on_weekday(Weekday::Mon)
            .on_weekday(Weekday::Mon);
        assert_eq!(r.by_weekday, vec![Weekday::Mon]);
    }

    #[test]
    fn parses_plain_rule() {
        let r: Recurrence = "FREQ=DAILY;INTERVAL=2;COUNT=4".parse().unwrap();
        assert_eq!(r.frequency, Frequency::Daily);
        assert_eq!(r.interval, 2);
        assert_eq!(r.count, Some(4));
        assert_eq!(r.to_string(), "FREQ=DAILY;INTERVAL=2;COUNT=4");
    }

    #[test]
    fn parses_two_line_form_and_keeps_start_time() {
        let text = "DTSTART:20201201T093000\nRRULE:FREQ=MONTHLY;BYDAY=TU";
        let r: Recurrence = text.parse().unwrap();
        assert_eq!(r.start, Some(d(2020, 12, 1)));
        assert_eq!(r.by_weekday, vec![Weekday::Tue]);
        assert_eq!(r.to_string(), text);
    }

    #[test]
    fn time_zone_start_line_is_kept() {
        let text = "DTSTART;TZID=Europe/Warsaw:20210301T080000\nRRULE:FREQ=DAILY";
        let r: Recurrence = text.parse().unwrap();
        assert_eq!(r.start, Some(d(2021, 3, 1)));
        assert_eq!(r.to_string(), text);
        assert_eq!(
            r.starting(d(2021, 4, 1)).to_string(),
            "DTSTART:20210401T000000Z\nRRULE:FREQ=DAILY"
        );
    }

    #[test]
    fn parses_case_insensitively() {
        let r: Recurrence = "RRULE:freq=weekly;byday=mo,we".parse().unwrap();
        assert_eq!(r.frequency, Frequency::Weekly);
        assert_eq!(r.by_weekday, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn built_rules_parse_back_to_the_same_schedule() {
        let rules = vec![
            Recurrence::new(Frequency::Monthly).on_month_day(15),
            Recurrence::new(Frequency::Weekly).every(3).on_weekday(Weekday::Sat),
            Recurrence::new(Frequency::Yearly).in_month(4).count(5),
            Recurrence::new(Frequency::Daily)
                .starting(d(2021, 2, 1))
                .until(d(2021, 3, 1)),
        ];
        for r in rules {
            let parsed: Recurrence = r.to_string().parse().unwrap();
            assert_eq!(parsed, r);
        }
    }

    #[test]
    fn rejects_garbage() {
        let err = "adsf".parse::<Recurrence>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecurrence(_)));
    }

    #[test]
    fn rejects_unknown_frequency() {
        assert!("FREQ=FORTNIGHTLY".parse::<Recurrence>().is_err());
    }

    #[test]
    fn unmodelled_parts_are_written_back() {
        let r: Recurrence = "FREQ=WEEKLY;BYDAY=MO;wkst=SU".parse().unwrap();
        assert_eq!(r.by_weekday, vec![Weekday::Mon]);
        assert_eq!(r.extra_parts, vec![("WKST".to_string(), "SU".to_string())]);
        assert_eq!(r.to_string(), "FREQ=WEEKLY;BYDAY=MO;WKST=SU");

        let r: Recurrence = "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1".parse().unwrap();
        assert_eq!(r.to_string(), "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1");
        assert_eq!(
            r.describe(),
            "every month on Monday, Tuesday, Wednesday, Thursday and Friday (BYSETPOS=-1)"
        );
    }

    #[test]
    fn ordinal_weekdays_are_written_back() {
        let r: Recurrence = "FREQ=MONTHLY;BYDAY=1MO,-1FR".parse().unwrap();
        assert!(r.by_weekday.is_empty());
        assert_eq!(r.to_string(), "FREQ=MONTHLY;BYDAY=1MO,-1FR");
        assert_eq!(r.describe(), "every month (BYDAY=1MO,-1FR)");
    }

    #[test]
    fn rejects_malformed_parts() {
        assert!("FREQ=WEEKLY;BYDAY=XX".parse::<Recurrence>().is_err());
        assert!("FREQ=WEEKLY;BYDAY=0MO".parse::<Recurrence>().is_err());
        assert!("FREQ=WEEKLY;BYDAY=-128MO".parse::<Recurrence>().is_err());
        assert!("FREQ=DAILY;X_Y=1".parse::<Recurrence>().is_err());
        assert!("FREQ=DAILY;BYSETPOS=".parse::<Recurrence>().is_err());
    }

    #[test]
    fn rejects_missing_frequency() {
        assert!("INTERVAL=2".parse::<Recurrence>().is_err());
        assert!("".parse::<Recurrence>().is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!("FREQ=MONTHLY;BYMONTHDAY=40".parse::<Recurrence>().is_err());
        assert!("FREQ=MONTHLY;BYMONTHDAY=0".parse::<Recurrence>().is_err());
        assert!("FREQ=YEARLY;BYMONTH=13".parse::<Recurrence>().is_err());
        assert!("FREQ=DAILY;INTERVAL=0".parse::<Recurrence>().is_err());
        assert!("FREQ=DAILY;COUNT=2;UNTIL=20211231".parse::<Recurrence>().is_err());
    }

    #[test]
    fn validate_messages() {
        let err = Recurrence::new(Frequency::Daily).every(0).validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Interval must be at least 1");

        let err = Recurrence::new(Frequency::Monthly)
            .on_month_day(32)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Day of month must be between 1 and 31");

        let err = Recurrence::new(Frequency::Daily)
            .starting(d(2021, 5, 1))
            .until(d(2021, 4, 1))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: End date must not be before start date"
        );

        let err = Recurrence::new(Frequency::Daily).count(0).validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Count must be at least 1");
    }

    #[test]
    fn frequency_round_trip() {
        for f in Frequency::ALL {
            assert_eq!(f.to_string().parse::<Frequency>().unwrap(), f);
        }
        assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Day-by-day projection
// ═══════════════════════════════════════════════════════════════════

mod daybyday {
    use super::*;

    #[test]
    fn deserializes_string_numbers_and_timestamps() {
        let body: DayByDayResponse = serde_json::from_value(json!({"daybydays": [{
            "date": "2021-01-02T00:00:00Z",
            "balance": {"open": "100.5", "low": "90", "high": "110", "close": "100"},
            "working_capital": {"open": 50, "low": 40, "high": 60, "close": 50},
            "high_prediction": {"open": 120, "low": 120, "high": 120, "close": 120},
            "low_prediction": {"open": 80, "low": 80, "high": 80, "close": 80}
        }]}))
        .unwrap();
        let p = &body.daybydays[0];
        assert_eq!(p.date, d(2021, 1, 2));
        assert_eq!(p.balance.open, 100.5);
        assert_eq!(p.balance.low, 90.0);
        assert_eq!(p.working_capital.low, 40.0);
    }

    #[test]
    fn rejects_non_finite_candle_figures() {
        let result: Result<Candle, _> = serde_json::from_value(json!({
            "open": "NaN", "low": 1, "high": 1, "close": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_envelope_is_empty() {
        let body: DayByDayResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.daybydays.is_empty());
    }

    #[test]
    fn window_params_are_iso_with_millis() {
        let w = ProjectionWindow::new(t0(), 365);
        assert_eq!(w.start_param(), "2021-01-01T00:00:00.000Z");
        assert_eq!(w.end_param(), "2022-01-01T00:00:00.000Z");
        assert_eq!(w.end - w.start, Duration::days(365));
    }

    #[test]
    fn window_contains_is_inclusive() {
        let w = ProjectionWindow::new(t0(), 90);
        assert!(w.contains(d(2021, 1, 1)));
        assert!(w.contains(d(2021, 4, 1)));
        assert!(!w.contains(d(2021, 4, 2)));
        assert!(!w.contains(d(2020, 12, 31)));
    }

    #[test]
    fn series_is_sorted_by_date() {
        let w = ProjectionWindow::new(t0(), 90);
        let series = ProjectionSeries::from_points(
            vec![point(d(2021, 1, 3), 3.0), point(d(2021, 1, 1), 1.0), point(d(2021, 1, 2), 2.0)],
            &w,
        )
        .unwrap();
        let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2021, 1, 1), d(2021, 1, 2), d(2021, 1, 3)]);
        assert_eq!(series.first_date(), Some(d(2021, 1, 1)));
        assert_eq!(series.last_date(), Some(d(2021, 1, 3)));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn series_rejects_duplicate_days() {
        let w = ProjectionWindow::new(t0(), 90);
        let err = ProjectionSeries::from_points(
            vec![point(d(2021, 1, 1), 1.0), point(d(2021, 1, 1), 2.0)],
            &w,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSeries(_)));
    }

    #[test]
    fn series_keeps_points_outside_window() {
        let w = ProjectionWindow::new(t0(), 1);
        let series =
            ProjectionSeries::from_points(vec![point(d(2021, 6, 1), 1.0)], &w).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn lowest_balance() {
        let w = ProjectionWindow::new(t0(), 90);
        let series = ProjectionSeries::from_points(
            vec![point(d(2021, 1, 1), 500.0), point(d(2021, 1, 2), -20.0), point(d(2021, 1, 3), 10.0)],
            &w,
        )
        .unwrap();
        assert_eq!(series.lowest_balance(), Some((d(2021, 1, 2), -20.0)));
        assert_eq!(ProjectionSeries::default().lowest_balance(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Horizon & ChartTab
// ═══════════════════════════════════════════════════════════════════

mod horizon {
    use super::*;

    #[test]
    fn days_per_horizon() {
        let days: Vec<i64> = Horizon::ALL.iter().map(|h| h.days()).collect();
        assert_eq!(days, vec![90, 365, 730, 1825, 3650, 7300, 10950]);
    }

    #[test]
    fn labels_parse_back() {
        for h in Horizon::ALL {
            assert_eq!(h.label().parse::<Horizon>().unwrap(), h);
        }
        assert!("6w".parse::<Horizon>().is_err());
    }

    #[test]
    fn long_horizons_are_speculative() {
        assert!(!Horizon::TwoYears.is_speculative());
        assert!(Horizon::FiveYears.is_speculative());
        assert!(Horizon::ThirtyYears.is_speculative());
    }

    #[test]
    fn default_is_three_months() {
        assert_eq!(Horizon::default(), Horizon::ThreeMonths);
    }

    #[test]
    fn serde_uses_labels() {
        assert_eq!(serde_json::to_value(Horizon::OneYear).unwrap(), json!("1y"));
        let h: Horizon = serde_json::from_value(json!("30y")).unwrap();
        assert_eq!(h, Horizon::ThirtyYears);
    }

    #[test]
    fn chart_tabs() {
        assert_eq!(ChartTab::default(), ChartTab::DisposableIncome);
        assert_eq!(ChartTab::DisposableIncome.label(), "Disposable Income");
        assert_eq!(ChartTab::Uncertainty.kind(), ChartKind::Line);
        assert_eq!(ChartTab::BalanceCandles.kind(), ChartKind::Candlestick);
        assert_eq!(ChartTab::ALL.len(), 4);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (k, v) in vars {
            map.insert(k.to_string(), v.to_string());
        }
        config::Environment::with_prefix("MONEYWISE").source(Some(map))
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.base_url, "http://localhost:8000");
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.default_horizon, Horizon::ThreeMonths);
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = Settings::from_environment(env(&[
            ("MONEYWISE_BASE_URL", "https://api.example.com/"),
            ("MONEYWISE_DEFAULT_HORIZON", "1y"),
            ("MONEYWISE_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(s.base_url, "https://api.example.com");
        assert_eq!(s.default_horizon, Horizon::OneYear);
        assert_eq!(s.request_timeout_secs, 5);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = Settings::from_environment(env(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn unknown_horizon_is_a_config_error() {
        let err = Settings::from_environment(env(&[("MONEYWISE_DEFAULT_HORIZON", "6w")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn validated_rejects_bad_urls() {
        let empty = Settings {
            base_url: "  ".into(),
            ..Settings::default()
        };
        assert!(matches!(empty.validated(), Err(CoreError::Config(_))));

        let ftp = Settings {
            base_url: "ftp://files".into(),
            ..Settings::default()
        };
        assert!(matches!(ftp.validated(), Err(CoreError::Config(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  UserIdentity
// ═══════════════════════════════════════════════════════════════════

mod user {
    use super::*;

    #[test]
    fn display_name_prefers_given_name() {
        let mut u = UserIdentity::new("auth0|123");
        assert_eq!(u.display_name(), "auth0|123");
        u.name = Some("James Smith".into());
        assert_eq!(u.display_name(), "James Smith");
        u.given_name = Some("James".into());
        assert_eq!(u.display_name(), "James");
    }

    #[test]
    fn deserializes_provider_profile() {
        let u: UserIdentity =
            serde_json::from_value(json!({"sub": "userid", "given_name": "James"})).unwrap();
        assert_eq!(u.sub, "userid");
        assert_eq!(u.given_name.as_deref(), Some("James"));
        assert_eq!(u.name, None);
    }
}
