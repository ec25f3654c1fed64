//! Rendering a descriptor back into RRULE text

use super::recurrence_types::{RecurrenceDescriptor, Weekday};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static FRACTIONAL_SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\d+").unwrap());

/// Canonical RRULE text for a descriptor.
///
/// Components are emitted in a fixed order: FREQ, INTERVAL (when not 1), COUNT,
/// UNTIL, BYDAY, BYMONTHDAY, BYMONTH, WKST (when not MO). `dtstart` is not
/// part of the rule and is never emitted.
pub fn to_rrule_string(rule: &RecurrenceDescriptor) -> String {
    let mut parts = vec![format!("FREQ={}", rule.freq)];

    if rule.interval != 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }
    if let Some(count) = rule.count {
        parts.push(format!("COUNT={}", count));
    }
    if let Some(until) = &rule.until {
        parts.push(format!("UNTIL={}", compact_until(until)));
    }
    if let Some(days) = rule.byweekday.as_deref().filter(|days| !days.is_empty()) {
        let codes: Vec<&str> = days.iter().map(Weekday::as_rrule_code).collect();
        parts.push(format!("BYDAY={}", codes.join(",")));
    }
    if let Some(days) = rule.bymonthday.as_deref().filter(|days| !days.is_empty()) {
        parts.push(format!("BYMONTHDAY={}", join_numbers(days)));
    }
    if let Some(months) = rule.bymonth.as_deref().filter(|months| !months.is_empty()) {
        parts.push(format!("BYMONTH={}", join_numbers(months)));
    }
    if rule.wkst != Weekday::Mo {
        parts.push(format!("WKST={}", rule.wkst));
    }

    parts.join(";")
}

/// Convert an UNTIL value into compact RRULE date-time form.
///
/// RFC 3339 values are shifted to UTC (`2026-03-01T06:00:00.000Z` becomes
/// `20260301T060000Z`); anything else has dashes, colons and fractional
/// seconds removed.
pub fn compact_until(value: &str) -> String {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return instant.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string();
    }
    let stripped: String = value.chars().filter(|c| *c != '-' && *c != ':').collect();
    FRACTIONAL_SECONDS.replace_all(&stripped, "").into_owned()
}

fn join_numbers(values: &[u8]) -> String {
    values.iter().map(u8::to_string).collect::<Vec<_>>().join(",")
}
