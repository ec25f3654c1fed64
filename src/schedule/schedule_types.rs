//! Typed, validated import document.
//
// Values of these types only come out of `ScheduleValidator`; every field has
// already passed its constraints and every default has been applied.

use crate::recurrence::{RecurrenceDescriptor, RuleNote};
use serde::Serialize;

/// Timezone used when a document does not name one
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Caller-supplied annotations, carried through untouched and in source order
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Root of a schedule import
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    pub timezone: String,
    pub events: Vec<OneOffEvent>,
    pub recurring: Vec<RecurringEvent>,
}

impl ImportDocument {
    /// A document with no events in the given timezone
    pub fn empty(timezone: impl Into<String>) -> Self {
        Self { timezone: timezone.into(), events: Vec::new(), recurring: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.recurring.is_empty()
    }
}

/// A single, non-repeating event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OneOffEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// An event described by an RRULE
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringEvent {
    pub id: String,
    pub title: String,
    /// Rule text exactly as imported
    pub rrule: String,
    /// Parsed form of `rrule`
    #[serde(skip)]
    pub rule: RecurrenceDescriptor,
    /// Leniencies the parser applied to `rrule`
    #[serde(skip)]
    pub rule_notes: Vec<RuleNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtstart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exdate: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}
