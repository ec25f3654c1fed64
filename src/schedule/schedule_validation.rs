//! Schema validation for schedule import documents.
//
// Validation walks the untyped JSON value once and records every violation it
// finds. Each field contributes at most one issue, so a document breaking N
// independent constraints yields exactly N issues.

use super::schedule_types::{ImportDocument, Metadata, OneOffEvent, RecurringEvent, DEFAULT_TIMEZONE};
use crate::recurrence::{self, Frequency, ParsePolicy, ParsedRule, RecurrenceDescriptor};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Category of a schema violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    Required,
    InvalidType,
    TooShort,
    TooLong,
    InvalidDate,
    InvalidTimezone,
    InvalidNumber,
    PatternMismatch,
}

/// One violated constraint, located by a dotted path such as `recurring.0.rrule`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn new(path: &FieldPath, kind: IssueKind, message: impl Into<String>) -> Self {
        Self { path: path.to_string(), message: message.into(), kind }
    }
}

/// The fallback timezone handed to a validator is not an IANA name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown default timezone '{0}'")]
pub struct UnknownTimezone(pub String);

/// A date/time accepted by the import schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// Date-time with an explicit offset or `Z`
    Instant(DateTime<FixedOffset>),
    /// Date-time without offset, interpreted in the document timezone
    Floating(NaiveDateTime),
    /// Calendar date only
    Date(NaiveDate),
}

const FLOATING_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse an ISO 8601 date or date-time string
pub fn parse_date_value(value: &str) -> Option<DateValue> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(DateValue::Instant(instant));
    }
    if let Ok(instant) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(DateValue::Instant(instant));
    }
    for format in FLOATING_FORMATS {
        if let Ok(floating) = NaiveDateTime::parse_from_str(value, format) {
            return Some(DateValue::Floating(floating));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().map(DateValue::Date)
}

/// Whether `value` denotes a valid date or date-time
pub fn is_valid_datetime(value: &str) -> bool {
    parse_date_value(value).is_some()
}

struct StringRule {
    /// Message reported for an empty string; `None` allows empty strings
    non_empty: Option<&'static str>,
    max_chars: Option<usize>,
}

const ID: StringRule = StringRule { non_empty: Some("Event ID is required"), max_chars: None };
const TITLE: StringRule =
    StringRule { non_empty: Some("Event title is required"), max_chars: Some(200) };
const RRULE: StringRule =
    StringRule { non_empty: Some("Recurrence rule is required"), max_chars: None };
const LOCATION: StringRule = StringRule { non_empty: None, max_chars: Some(500) };
const DESCRIPTION: StringRule = StringRule { non_empty: None, max_chars: Some(2000) };

/// Validates untyped JSON against the import document schema
#[derive(Debug, Clone)]
pub struct ScheduleValidator {
    default_timezone: String,
    rrule_policy: ParsePolicy,
}

impl Default for ScheduleValidator {
    fn default() -> Self {
        Self { default_timezone: DEFAULT_TIMEZONE.to_string(), rrule_policy: ParsePolicy::default() }
    }
}

impl ScheduleValidator {
    /// Fails when `default_timezone` does not resolve, so every validated
    /// document carries a usable timezone
    pub fn new(
        default_timezone: impl Into<String>,
        rrule_policy: ParsePolicy,
    ) -> Result<Self, UnknownTimezone> {
        let default_timezone = default_timezone.into();
        if default_timezone.parse::<Tz>().is_err() {
            return Err(UnknownTimezone(default_timezone));
        }
        Ok(Self { default_timezone, rrule_policy })
    }

    pub fn rrule_policy(&self) -> ParsePolicy {
        self.rrule_policy
    }

    /// Check `value` and build a defaulted document, or return every issue found
    pub fn validate(&self, value: &Value) -> Result<ImportDocument, Vec<ValidationIssue>> {
        let root = FieldPath::default();
        let Some(object) = value.as_object() else {
            return Err(vec![ValidationIssue::new(
                &root,
                IssueKind::InvalidType,
                expected("object", value),
            )]);
        };

        let mut issues = Vec::new();
        let mut fields = Fields { object, path: root, issues: &mut issues };
        let timezone = fields.timezone("timezone").unwrap_or_else(|| self.default_timezone.clone());
        let events = fields.records("events", |record| self.one_off(record));
        let recurring = fields.records("recurring", |record| self.recurring(record));

        if issues.is_empty() {
            Ok(ImportDocument { timezone, events, recurring })
        } else {
            Err(issues)
        }
    }

    fn one_off(&self, f: &mut Fields<'_, '_>) -> OneOffEvent {
        OneOffEvent {
            id: f.string("id", &ID).unwrap_or_default(),
            title: f.string("title", &TITLE).unwrap_or_default(),
            start: f.date("start", true).unwrap_or_default(),
            end: f.date("end", false),
            all_day: f.boolean("allDay").unwrap_or(false),
            location: f.string("location", &LOCATION),
            description: f.string("description", &DESCRIPTION),
            metadata: f.metadata("metadata"),
        }
    }

    fn recurring(&self, f: &mut Fields<'_, '_>) -> RecurringEvent {
        let id = f.string("id", &ID).unwrap_or_default();
        let title = f.string("title", &TITLE).unwrap_or_default();
        let (rrule, parsed) = f.rule("rrule", self.rrule_policy).unwrap_or_else(|| {
            let rule = RecurrenceDescriptor::new(Frequency::Weekly);
            (String::new(), ParsedRule { rule, notes: Vec::new() })
        });

        RecurringEvent {
            id,
            title,
            rrule,
            rule: parsed.rule,
            rule_notes: parsed.notes,
            dtstart: f.date("dtstart", false),
            duration_minutes: f.positive_integer("durationMinutes"),
            exdate: f.date_list("exdate"),
            location: f.string("location", &LOCATION),
            description: f.string("description", &DESCRIPTION),
            metadata: f.metadata("metadata"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FieldPath(Vec<String>);

impl FieldPath {
    fn child(&self, segment: impl ToString) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("root")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Typed accessors over one JSON object that report into a shared issue list
struct Fields<'v, 'i> {
    object: &'v Map<String, Value>,
    path: FieldPath,
    issues: &'i mut Vec<ValidationIssue>,
}

impl<'v> Fields<'v, '_> {
    fn report(&mut self, key: &str, kind: IssueKind, message: impl Into<String>) {
        let path = self.path.child(key);
        self.issues.push(ValidationIssue::new(&path, kind, message));
    }

    /// Present value, or a `Required` issue when `required` and absent
    fn get(&mut self, key: &str, required: bool) -> Option<&'v Value> {
        let value = self.object.get(key);
        if value.is_none() && required {
            self.report(key, IssueKind::Required, "Required");
        }
        value
    }

    fn str_value(&mut self, key: &str, required: bool) -> Option<&'v str> {
        match self.get(key, required)? {
            Value::String(text) => Some(text.as_str()),
            other => {
                self.report(key, IssueKind::InvalidType, expected("string", other));
                None
            }
        }
    }

    fn string(&mut self, key: &str, rule: &StringRule) -> Option<String> {
        let text = self.str_value(key, rule.non_empty.is_some())?;
        if let Some(message) = rule.non_empty {
            if text.is_empty() {
                self.report(key, IssueKind::TooShort, message);
                return None;
            }
        }
        if let Some(max) = rule.max_chars {
            if text.chars().count() > max {
                self.report(
                    key,
                    IssueKind::TooLong,
                    format!("String must contain at most {} character(s)", max),
                );
                return None;
            }
        }
        Some(text.to_string())
    }

    fn date(&mut self, key: &str, required: bool) -> Option<String> {
        let text = self.str_value(key, required)?;
        if !is_valid_datetime(text) {
            self.report(key, IssueKind::InvalidDate, format!("Invalid date/time '{}'", text));
            return None;
        }
        Some(text.trim().to_string())
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.get(key, false)? {
            Value::Bool(flag) => Some(*flag),
            other => {
                self.report(key, IssueKind::InvalidType, expected("boolean", other));
                None
            }
        }
    }

    fn positive_integer(&mut self, key: &str) -> Option<u32> {
        let number = match self.get(key, false)? {
            Value::Number(number) => number,
            other => {
                self.report(key, IssueKind::InvalidType, expected("number", other));
                return None;
            }
        };
        let whole = number.as_u64().or_else(|| {
            number.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)
        });
        match whole.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0) {
            Some(n) => Some(n),
            None => {
                self.report(key, IssueKind::InvalidNumber, "Number must be a positive integer");
                None
            }
        }
    }

    fn date_list(&mut self, key: &str) -> Option<Vec<String>> {
        let items = match self.get(key, false)? {
            Value::Array(items) => items,
            other => {
                self.report(key, IssueKind::InvalidType, expected("array", other));
                return None;
            }
        };
        let mut dates = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            let path = self.path.child(key).child(index);
            match item.as_str() {
                Some(text) if is_valid_datetime(text) => dates.push(text.trim().to_string()),
                Some(text) => {
                    valid = false;
                    self.issues.push(ValidationIssue::new(
                        &path,
                        IssueKind::InvalidDate,
                        format!("Invalid date/time '{}'", text),
                    ));
                }
                None => {
                    valid = false;
                    self.issues.push(ValidationIssue::new(
                        &path,
                        IssueKind::InvalidType,
                        expected("string", item),
                    ));
                }
            }
        }
        valid.then_some(dates)
    }

    fn metadata(&mut self, key: &str) -> Option<Metadata> {
        match self.get(key, false)? {
            Value::Object(map) => Some(map.clone()),
            other => {
                self.report(key, IssueKind::InvalidType, expected("object", other));
                None
            }
        }
    }

    fn timezone(&mut self, key: &str) -> Option<String> {
        let name = self.str_value(key, false)?;
        if name.parse::<Tz>().is_err() {
            self.report(key, IssueKind::InvalidTimezone, format!("Unknown timezone '{}'", name));
            return None;
        }
        Some(name.to_string())
    }

    fn rule(&mut self, key: &str, policy: ParsePolicy) -> Option<(String, ParsedRule)> {
        let text = self.string(key, &RRULE)?;
        match recurrence::parse_with_notes(&text, policy) {
            Ok(parsed) => Some((text, parsed)),
            Err(err) => {
                self.report(
                    key,
                    IssueKind::PatternMismatch,
                    format!("Invalid recurrence rule: {}", err),
                );
                None
            }
        }
    }

    /// Array of objects under `key`; absent means empty
    fn records<T>(&mut self, key: &str, mut build: impl FnMut(&mut Fields<'_, '_>) -> T) -> Vec<T> {
        let path = self.path.child(key);
        let items = match self.object.get(key) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.issues.push(ValidationIssue::new(
                    &path,
                    IssueKind::InvalidType,
                    expected("array", other),
                ));
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = path.child(index);
            match item.as_object() {
                Some(object) => {
                    let mut fields = Fields { object, path: item_path, issues: &mut *self.issues };
                    records.push(build(&mut fields));
                }
                None => self.issues.push(ValidationIssue::new(
                    &item_path,
                    IssueKind::InvalidType,
                    expected("object", item),
                )),
            }
        }
        records
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(wanted: &str, value: &Value) -> String {
    format!("Expected {}, received {}", wanted, type_name(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{RuleNote, Weekday};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn validate(value: Value) -> Result<ImportDocument, Vec<ValidationIssue>> {
        ScheduleValidator::default().validate(&value)
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.path.as_str()).collect()
    }

    #[test_case("2026-01-20T10:00:00-06:00" ; "rfc3339 with offset")]
    #[test_case("2026-01-20T16:00:00.000Z" ; "rfc3339 utc with millis")]
    #[test_case("2026-01-20T10:00-06:00" ; "offset without seconds")]
    #[test_case("2026-01-20T10:00:00" ; "floating date-time")]
    #[test_case("2026-01-20T10:00" ; "floating without seconds")]
    #[test_case("2026-01-20 10:00:00" ; "space separator")]
    #[test_case("2026-01-20" ; "date only")]
    fn test_accepts_iso_dates(value: &str) {
        assert!(is_valid_datetime(value), "{} should be accepted", value);
    }

    #[test_case("not-a-date" ; "garbage")]
    #[test_case("" ; "empty")]
    #[test_case("2026-02-30" ; "impossible day")]
    #[test_case("2026-01-20T25:00:00Z" ; "impossible hour")]
    #[test_case("20260120T100000Z" ; "compact rrule form")]
    #[test_case("01/20/2026" ; "us date")]
    fn test_rejects_non_iso_dates(value: &str) {
        assert!(!is_valid_datetime(value), "{} should be rejected", value);
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let document = validate(json!({})).unwrap();
        assert_eq!(document, ImportDocument::empty("America/Chicago"));
    }

    #[test]
    fn test_configured_default_timezone() {
        let validator = ScheduleValidator::new("America/Denver", ParsePolicy::Lenient).unwrap();
        let document = validator.validate(&json!({})).unwrap();
        assert_eq!(document.timezone, "America/Denver");
    }

    #[test]
    fn test_unknown_default_timezone_is_rejected() {
        let err = ScheduleValidator::new("Not/AZone", ParsePolicy::Lenient).unwrap_err();
        assert_eq!(err, UnknownTimezone("Not/AZone".to_string()));
        assert_eq!(err.to_string(), "Unknown default timezone 'Not/AZone'");
    }

    #[test]
    fn test_padded_dates_are_stored_trimmed() {
        let document = validate(json!({
            "events": [{ "id": "e", "title": "t", "start": "  2026-01-20  ", "end": "2026-01-21\n" }],
            "recurring": [{
                "id": "r", "title": "t", "rrule": "FREQ=DAILY",
                "dtstart": " 2026-01-06T18:00:00-06:00", "exdate": ["2026-01-13 "]
            }]
        }))
        .unwrap();
        assert_eq!(document.events[0].start, "2026-01-20");
        assert_eq!(document.events[0].end.as_deref(), Some("2026-01-21"));
        assert_eq!(document.recurring[0].dtstart.as_deref(), Some("2026-01-06T18:00:00-06:00"));
        assert_eq!(document.recurring[0].exdate, Some(vec!["2026-01-13".to_string()]));
    }

    #[test]
    fn test_valid_one_off_event() {
        let document = validate(json!({
            "events": [{
                "id": "e1",
                "title": "Walkthrough",
                "start": "2026-01-20T10:00:00-06:00",
                "end": "2026-01-20T10:30:00-06:00",
                "location": "Suite 200"
            }],
            "recurring": []
        }))
        .unwrap();

        let event = &document.events[0];
        assert_eq!(event.id, "e1");
        assert_eq!(event.start, "2026-01-20T10:00:00-06:00");
        assert_eq!(event.end.as_deref(), Some("2026-01-20T10:30:00-06:00"));
        assert!(!event.all_day);
        assert_eq!(event.location.as_deref(), Some("Suite 200"));
        assert_eq!(event.metadata, None);
    }

    #[test]
    fn test_valid_recurring_event() {
        let document = validate(json!({
            "recurring": [{
                "id": "r1",
                "title": "Nightly office clean",
                "rrule": "FREQ=WEEKLY;BYDAY=MO,WE,FR;X-CUSTOM=1",
                "dtstart": "2026-01-06T18:00:00-06:00",
                "durationMinutes": 120,
                "exdate": ["2026-01-19T18:00:00-06:00"]
            }]
        }))
        .unwrap();

        let event = &document.recurring[0];
        assert_eq!(event.rule.byweekday, Some(vec![Weekday::Mo, Weekday::We, Weekday::Fr]));
        assert_eq!(event.rule_notes, vec![RuleNote::IgnoredKey { key: "X-CUSTOM".to_string() }]);
        assert_eq!(event.duration_minutes, Some(120));
        assert_eq!(event.exdate, Some(vec!["2026-01-19T18:00:00-06:00".to_string()]));
    }

    #[test]
    fn test_invalid_one_off_reports_every_field() {
        let issues = validate(json!({
            "events": [{ "id": "", "title": "", "start": "not-a-date" }]
        }))
        .unwrap_err();

        assert_eq!(paths(&issues), vec!["events.0.id", "events.0.title", "events.0.start"]);
        assert_eq!(issues[0].message, "Event ID is required");
        assert_eq!(issues[1].message, "Event title is required");
        assert_eq!(issues[2].kind, IssueKind::InvalidDate);
    }

    #[test]
    fn test_collects_independent_violations_in_one_pass() {
        let issues = validate(json!({
            "timezone": "Mars/Olympus_Mons",
            "events": [
                { "id": "a", "title": "x".repeat(201), "start": "2026-01-20", "allDay": "yes" },
                { "id": "b", "title": "ok", "metadata": [1, 2] }
            ],
            "recurring": [
                { "id": 7, "title": "Weekly", "rrule": "FREQ=SECONDLY", "durationMinutes": -5,
                  "exdate": ["2026-01-01", "soon"], "description": "d".repeat(2001) }
            ]
        }))
        .unwrap_err();

        assert_eq!(
            paths(&issues),
            vec![
                "timezone",
                "events.0.title",
                "events.0.allDay",
                "events.1.start",
                "events.1.metadata",
                "recurring.0.id",
                "recurring.0.rrule",
                "recurring.0.durationMinutes",
                "recurring.0.exdate.1",
                "recurring.0.description",
            ]
        );
        assert_eq!(issues[1].message, "String must contain at most 200 character(s)");
        assert_eq!(issues[2].message, "Expected boolean, received string");
        assert_eq!(issues[3].kind, IssueKind::Required);
        assert_eq!(issues[5].message, "Expected string, received number");
        assert_eq!(issues[6].kind, IssueKind::PatternMismatch);
        assert_eq!(issues[7].kind, IssueKind::InvalidNumber);
    }

    #[test]
    fn test_non_object_root() {
        let issues = validate(json!([1, 2, 3])).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "root");
        assert_eq!(issues[0].message, "Expected object, received array");
    }

    #[test]
    fn test_non_array_collections() {
        let issues = validate(json!({ "events": {}, "recurring": "none" })).unwrap_err();
        assert_eq!(paths(&issues), vec!["events", "recurring"]);

        let issues = validate(json!({ "events": [42] })).unwrap_err();
        assert_eq!(paths(&issues), vec!["events.0"]);
    }

    #[test]
    fn test_null_optional_field_is_wrong_type() {
        let issues = validate(json!({
            "events": [{ "id": "e", "title": "t", "start": "2026-01-20", "end": null }]
        }))
        .unwrap_err();
        assert_eq!(issues[0].path, "events.0.end");
        assert_eq!(issues[0].message, "Expected string, received null");
    }

    #[test]
    fn test_strict_policy_rejects_lenient_rules() {
        let validator = ScheduleValidator::new(DEFAULT_TIMEZONE, ParsePolicy::Strict).unwrap();
        let issues = validator
            .validate(&json!({ "recurring": [{ "id": "r", "title": "t", "rrule": "BYDAY=MO" }] }))
            .unwrap_err();
        assert_eq!(issues[0].path, "recurring.0.rrule");
        assert_eq!(
            issues[0].message,
            "Invalid recurrence rule: recurrence rule has no FREQ component"
        );
    }

    #[test]
    fn test_metadata_keeps_source_order() {
        let document = validate(json!({
            "events": [{
                "id": "e", "title": "t", "start": "2026-01-20",
                "metadata": { "zeta": 1, "alpha": { "nested": [true] }, "mid": null }
            }]
        }))
        .unwrap();
        let metadata = document.events[0].metadata.as_ref().unwrap();
        let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(metadata["alpha"], json!({ "nested": [true] }));
    }

    #[test]
    fn test_whole_float_duration_is_accepted() {
        let document = validate(json!({
            "recurring": [{ "id": "r", "title": "t", "rrule": "FREQ=DAILY", "durationMinutes": 45.0 }]
        }))
        .unwrap();
        assert_eq!(document.recurring[0].duration_minutes, Some(45));

        let issues = validate(json!({
            "recurring": [{ "id": "r", "title": "t", "rrule": "FREQ=DAILY", "durationMinutes": 1.5 }]
        }))
        .unwrap_err();
        assert_eq!(issues[0].path, "recurring.0.durationMinutes");
    }
}
