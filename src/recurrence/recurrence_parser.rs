//! RRULE text parsing.
//
// Keys and the FREQ/BYDAY/WKST values are matched case-insensitively. UNTIL is
// shape-checked but kept as the raw compact string.

use super::recurrence_types::{
    Frequency, ParsePolicy, ParsedRule, RecurrenceDescriptor, RuleNote, Weekday,
};
use super::RecurrenceError;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static DTSTART_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^DTSTART(?:;[^:]*)?:(\S+)$").unwrap());

// `NAME:value` or `NAME;PARAM=x:value`; bare rule text never matches
static PROPERTY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)(?:;[^:]*)?:").unwrap());

static COMPACT_UNTIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}(?:T\d{6}Z?)?$").unwrap());

/// Parse rule text with the lenient policy, discarding notes
pub fn parse(text: &str) -> Result<RecurrenceDescriptor, RecurrenceError> {
    parse_with_notes(text, ParsePolicy::Lenient).map(|parsed| parsed.rule)
}

/// Parse rule text, reporting every leniency the policy allowed.
///
/// Accepts either a bare rule (`FREQ=WEEKLY;BYDAY=MO`) or an RFC 5545 fragment
/// made of an optional `DTSTART` line and an `RRULE:` line. Other property
/// lines (`EXDATE`, `RDATE`, ...) are skipped when lenient.
pub fn parse_with_notes(text: &str, policy: ParsePolicy) -> Result<ParsedRule, RecurrenceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RecurrenceError::Empty);
    }

    let mut dtstart = None;
    let mut body: Option<&str> = None;
    let mut skipped = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(caps) = DTSTART_LINE.captures(line) {
            dtstart = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = PROPERTY_LINE.captures(line) {
            let name = caps[1].to_ascii_uppercase();
            if name != "RRULE" {
                if policy == ParsePolicy::Strict {
                    return Err(RecurrenceError::UnsupportedProperty(name));
                }
                debug!("Skipping {} line in recurrence text", name);
                skipped.push(RuleNote::IgnoredLine { name });
                continue;
            }
        }
        if body.is_some() {
            return Err(RecurrenceError::MultipleRules);
        }
        body = Some(strip_rrule_prefix(line));
    }

    let mut parser = ComponentParser::new(policy);
    if let Some(body) = body {
        for component in body.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            parser.component(component)?;
        }
    }

    let ComponentParser { mut rule, freq, mut notes, .. } = parser;
    notes.extend(skipped);
    rule.dtstart = dtstart;
    rule.freq = match freq {
        Some(freq) => freq,
        None if policy == ParsePolicy::Strict => return Err(RecurrenceError::MissingFrequency),
        None => {
            warn!("Recurrence rule '{}' has no FREQ; defaulting to WEEKLY", text);
            notes.insert(0, RuleNote::DefaultedFrequency);
            Frequency::Weekly
        }
    };

    Ok(ParsedRule { rule, notes })
}

fn strip_rrule_prefix(line: &str) -> &str {
    match line.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &line[6..],
        _ => line,
    }
}

struct ComponentParser {
    policy: ParsePolicy,
    rule: RecurrenceDescriptor,
    freq: Option<Frequency>,
    seen: HashSet<String>,
    notes: Vec<RuleNote>,
}

impl ComponentParser {
    fn new(policy: ParsePolicy) -> Self {
        Self {
            policy,
            // freq is filled in once every component has been seen
            rule: RecurrenceDescriptor::new(Frequency::Weekly),
            freq: None,
            seen: HashSet::new(),
            notes: Vec::new(),
        }
    }

    fn component(&mut self, component: &str) -> Result<(), RecurrenceError> {
        let (key, value) = component
            .split_once('=')
            .ok_or_else(|| RecurrenceError::MalformedComponent(component.to_string()))?;
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        if !self.seen.insert(key.clone()) {
            if self.policy == ParsePolicy::Strict {
                return Err(RecurrenceError::DuplicateKey(key));
            }
            debug!("Keeping first value of repeated RRULE component {}", key);
            self.notes.push(RuleNote::DuplicateKey { key });
            return Ok(());
        }

        match key.as_str() {
            "FREQ" => {
                let freq = value
                    .parse::<Frequency>()
                    .map_err(|_| RecurrenceError::UnsupportedFrequency(value.to_string()))?;
                self.freq = Some(freq);
            }
            "INTERVAL" => self.rule.interval = parse_positive(&key, value)?,
            "COUNT" => self.rule.count = Some(parse_positive(&key, value)?),
            "UNTIL" => {
                if !COMPACT_UNTIL.is_match(value) {
                    return Err(RecurrenceError::MalformedUntil(value.to_string()));
                }
                self.rule.until = Some(value.to_string());
            }
            "BYDAY" => self.rule.byweekday = Some(parse_weekdays(value)?),
            "BYMONTHDAY" => self.rule.bymonthday = Some(parse_ranged(&key, value, 1, 31)?),
            "BYMONTH" => self.rule.bymonth = Some(parse_ranged(&key, value, 1, 12)?),
            "WKST" => {
                self.rule.wkst = value
                    .parse::<Weekday>()
                    .map_err(|_| RecurrenceError::UnknownWeekday(value.to_string()))?;
            }
            _ => {
                if self.policy == ParsePolicy::Strict {
                    return Err(RecurrenceError::UnknownKey(key));
                }
                debug!("Ignoring unsupported RRULE component {}", key);
                self.notes.push(RuleNote::IgnoredKey { key });
            }
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, RecurrenceError> {
    let number = value.parse::<u32>().map_err(|_| RecurrenceError::MalformedNumber {
        key: key.to_string(),
        value: value.to_string(),
    })?;
    if number == 0 {
        return Err(RecurrenceError::NotPositive { key: key.to_string() });
    }
    Ok(number)
}

fn parse_weekdays(value: &str) -> Result<Vec<Weekday>, RecurrenceError> {
    value
        .split(',')
        .map(|code| {
            code.parse::<Weekday>()
                .map_err(|_| RecurrenceError::UnknownWeekday(code.trim().to_string()))
        })
        .collect()
}

fn parse_ranged(key: &str, value: &str, min: u8, max: u8) -> Result<Vec<u8>, RecurrenceError> {
    value
        .split(',')
        .map(str::trim)
        .map(|item| {
            let number = item.parse::<u32>().map_err(|_| RecurrenceError::MalformedNumber {
                key: key.to_string(),
                value: item.to_string(),
            })?;
            if number < u32::from(min) || number > u32::from(max) {
                return Err(RecurrenceError::OutOfRange { key: key.to_string(), value: number, min, max });
            }
            Ok(number as u8)
        })
        .collect()
}
